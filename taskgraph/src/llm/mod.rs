//! LLM client abstraction used by agent steps.
//!
//! Steps depend on a callable that returns assistant text and optional tool calls;
//! this module defines the trait, a scripted mock, a retrying wrapper and (feature
//! `openai`) an OpenAI-compatible client.

mod mock;
mod retry;

#[cfg(feature = "openai")]
mod openai;

pub use mock::{MockLlm, MockReply};
pub use retry::{RetryConfig, RetryingLlm};

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;

/// Response from an LLM completion: assistant message text and optional tool calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls requested in this turn; empty when the model answered directly.
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// LLM client: given messages, returns assistant text and optional tool calls.
///
/// Implementations: [`MockLlm`], [`RetryingLlm`] (wraps another client), `ChatOpenAI`
/// (feature `openai`).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content and optional tool calls.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}
