//! Mock LLM for tests and offline runs.
//!
//! Three modes: a fixed reply, a scripted queue of replies (including failures), or a
//! closure that answers from the prompt. Every call's messages are recorded.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;

use super::{LlmClient, LlmResponse};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    ToolCalls {
        content: String,
        calls: Vec<ToolCall>,
    },
    Fail(String),
}

type Responder = Arc<dyn Fn(&[Message]) -> Result<LlmResponse, AgentError> + Send + Sync>;

enum Mode {
    Fixed(String),
    Script(Mutex<VecDeque<MockReply>>),
    Responder(Responder),
}

/// Mock LLM client.
///
/// **Interaction**: Implements `LlmClient`; used by step and graph tests in place of a
/// real model.
pub struct MockLlm {
    mode: Mode,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Always answers `content`.
    pub fn with_reply(content: impl Into<String>) -> Self {
        Self::from_mode(Mode::Fixed(content.into()))
    }

    /// Answers from `replies` in order; fails once the script is exhausted.
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self::from_mode(Mode::Script(Mutex::new(replies.into_iter().collect())))
    }

    /// Answers by calling `f` with the prompt messages.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Message]) -> Result<LlmResponse, AgentError> + Send + Sync + 'static,
    {
        Self::from_mode(Mode::Responder(Arc::new(f)))
    }

    fn from_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, one entry per call.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());

        match &self.mode {
            Mode::Fixed(content) => Ok(LlmResponse::text(content.clone())),
            Mode::Responder(f) => f(messages),
            Mode::Script(queue) => {
                let next = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                match next {
                    Some(MockReply::Text(content)) => Ok(LlmResponse::text(content)),
                    Some(MockReply::ToolCalls { content, calls }) => Ok(LlmResponse {
                        content,
                        tool_calls: calls,
                    }),
                    Some(MockReply::Fail(message)) => Err(AgentError::ExecutionFailed(message)),
                    None => Err(AgentError::ExecutionFailed(
                        "mock llm script exhausted".to_string(),
                    )),
                }
            }
        }
    }
}
