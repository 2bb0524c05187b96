//! Assistant node: one LLM turn over the conversation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::GraphState;

use super::{AssistantPatch, AssistantStage, AssistantState, ASSISTANT};

/// Default cap on tool rounds per conversation.
pub const DEFAULT_MAX_TURNS: u32 = 8;

/// Calls the LLM with the message history. Tool calls move the loop to the tool
/// executor; a plain answer ends it.
///
/// Calls without an id get `call_<turn>_<position>`. Once `max_turns` tool rounds have
/// run, further tool requests are ignored and the reply text is the answer.
///
/// **Interaction**: Registered as `assistant` by `build_assistant_graph`; pairs with
/// `ToolExecutorNode`.
pub struct AssistantNode {
    llm: Arc<dyn LlmClient>,
    max_turns: u32,
}

impl AssistantNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

#[async_trait]
impl Node<AssistantState> for AssistantNode {
    fn id(&self) -> &str {
        ASSISTANT
    }

    async fn run(&self, state: &AssistantState) -> Result<AssistantPatch, AgentError> {
        let response = match self.llm.invoke(&state.messages).await {
            Ok(r) => r,
            Err(e) => return Ok(AssistantState::failure(format!("assistant turn failed: {}", e))),
        };
        let messages = if response.content.is_empty() {
            Vec::new()
        } else {
            vec![Message::assistant(response.content)]
        };

        if response.tool_calls.is_empty() {
            return Ok(AssistantPatch {
                messages,
                tool_calls: Some(Vec::new()),
                stage: Some(AssistantStage::Done),
                ..Default::default()
            });
        }
        if state.turn_count >= self.max_turns {
            warn!(max_turns = self.max_turns, "tool round cap reached; answering without tools");
            return Ok(AssistantPatch {
                messages,
                tool_calls: Some(Vec::new()),
                stage: Some(AssistantStage::Done),
                ..Default::default()
            });
        }

        let turn = state.turn_count + 1;
        let calls: Vec<_> = response
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, mut call)| {
                if call.id.trim().is_empty() {
                    call.id = format!("call_{}_{}", turn, i);
                }
                call
            })
            .collect();
        debug!(turn, calls = calls.len(), "assistant requested tools");
        Ok(AssistantPatch {
            messages,
            tool_calls: Some(calls),
            turn_count: Some(turn),
            stage: Some(AssistantStage::Acting),
            ..Default::default()
        })
    }
}
