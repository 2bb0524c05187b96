//! LLM construction from [`RunConfig`]: `ChatOpenAI` wrapped in `RetryingLlm`.

use std::sync::Arc;

use taskgraph::LlmClient;

use crate::config::{Error, RunConfig};

/// Builds the model client for `config`.
#[cfg(feature = "openai")]
pub fn build_llm(config: &RunConfig) -> Result<Arc<dyn LlmClient>, Error> {
    use async_openai::config::OpenAIConfig;
    use taskgraph::{ChatOpenAI, RetryingLlm};

    if config.api_key.is_empty() {
        return Err("OPENAI_API_KEY is not set; please configure it in .env".into());
    }
    let openai_config = OpenAIConfig::new()
        .with_api_base(&config.api_base)
        .with_api_key(config.api_key.clone());
    let mut llm = ChatOpenAI::with_config(openai_config, config.model.clone());
    if let Some(t) = config.temperature {
        llm = llm.with_temperature(t);
    }
    tracing::debug!(model = %config.model, api_base = %config.api_base, "llm configured");
    Ok(Arc::new(RetryingLlm::new(Box::new(llm), config.retry_config())))
}

/// Without the `openai` feature there is no model client to build.
#[cfg(not(feature = "openai"))]
pub fn build_llm(_config: &RunConfig) -> Result<Arc<dyn LlmClient>, Error> {
    Err("taskgraph-cli was built without the `openai` feature; no LLM client available".into())
}
