//! Retrying LLM wrapper: bounded retries with exponential backoff.
//!
//! Steps call the model once; transient failures are absorbed here so a step only
//! sees an error after the retry budget is spent.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::AgentError;
use crate::message::Message;

use super::{LlmClient, LlmResponse};

/// Retry budget and backoff bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    config
        .initial_backoff
        .saturating_mul(factor)
        .min(config.max_backoff)
}

/// An LLM client that retries failed requests.
pub struct RetryingLlm {
    inner: Box<dyn LlmClient>,
    config: RetryConfig,
}

impl RetryingLlm {
    pub fn new(inner: Box<dyn LlmClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmClient for RetryingLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;
        loop {
            match self.inner.invoke(messages).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < max_retries => {
                    let backoff = calculate_backoff(attempt, &self.config);
                    warn!(
                        attempt = attempt + 1,
                        max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "retrying LLM request"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
