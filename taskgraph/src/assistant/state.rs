//! Assistant loop state.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::state::{GraphState, ToolCall, ToolResult};

/// Phase of the assistant loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantStage {
    #[default]
    Thinking,
    Acting,
    Done,
}

impl AssistantStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Acting => "acting",
            Self::Done => "done",
        }
    }
}

/// State of a tool-calling conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantState {
    pub messages: Vec<Message>,
    /// Calls requested by the last assistant turn, pending execution.
    pub tool_calls: Vec<ToolCall>,
    /// Results of the last executed batch.
    pub tool_results: Vec<ToolResult>,
    /// Assistant turns that requested tools.
    pub turn_count: u32,
    pub error: Option<String>,
    pub stage: AssistantStage,
}

impl AssistantState {
    /// A conversation with an optional system prompt and one user message.
    pub fn new(system: Option<&str>, user: impl Into<String>) -> Self {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(user));
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Content of the last assistant message.
    pub fn last_answer(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// Partial update to [`AssistantState`]. `messages` appends; the rest overwrite when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPatch {
    pub messages: Vec<Message>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub tool_results: Option<Vec<ToolResult>>,
    pub turn_count: Option<u32>,
    pub error: Option<Option<String>>,
    pub stage: Option<AssistantStage>,
}

impl GraphState for AssistantState {
    type Patch = AssistantPatch;

    fn apply(&mut self, patch: AssistantPatch) {
        self.messages.extend(patch.messages);
        if let Some(calls) = patch.tool_calls {
            self.tool_calls = calls;
        }
        if let Some(results) = patch.tool_results {
            self.tool_results = results;
        }
        if let Some(n) = patch.turn_count {
            self.turn_count = n;
        }
        if let Some(error) = patch.error {
            self.error = error.filter(|e| !e.trim().is_empty());
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }

    fn is_complete(&self) -> bool {
        self.stage == AssistantStage::Done
    }

    fn active_agent(&self) -> &str {
        match self.stage {
            AssistantStage::Acting => super::TOOLS,
            _ => super::ASSISTANT,
        }
    }

    fn current_step(&self) -> &str {
        self.stage.as_str()
    }

    fn failure(message: String) -> AssistantPatch {
        AssistantPatch {
            error: Some(Some(message)),
            ..Default::default()
        }
    }

    fn describe(&self) -> Option<String> {
        match self.stage {
            AssistantStage::Acting => Some(format!("{} tool call(s) pending", self.tool_calls.len())),
            _ if !self.tool_results.is_empty() => {
                Some(format!("{} tool result(s)", self.tool_results.len()))
            }
            _ => None,
        }
    }
}
