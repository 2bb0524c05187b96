//! Tool executor node: runs pending tool calls through the registry.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::error::AgentError;
use crate::graph::Node;
use crate::message::Message;
use crate::tool_source::{truncate_for_log, ToolRegistry};

use super::{AssistantPatch, AssistantStage, AssistantState, TOOLS};

/// Executes every pending call in order. Failures become error-text results so the
/// model can see them and correct itself; the step itself does not fail.
pub struct ToolExecutorNode {
    tools: Arc<ToolRegistry>,
}

impl ToolExecutorNode {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Node<AssistantState> for ToolExecutorNode {
    fn id(&self) -> &str {
        TOOLS
    }

    async fn run(&self, state: &AssistantState) -> Result<AssistantPatch, AgentError> {
        let mut results = Vec::with_capacity(state.tool_calls.len());
        for call in &state.tool_calls {
            let result = self.tools.execute_call(call).await;
            trace!(
                tool = %call.name,
                is_error = result.is_error,
                preview = %truncate_for_log(&result.content, 200),
                "tool returned"
            );
            results.push(result);
        }
        let observations = results
            .iter()
            .map(|r| Message::user(format!("Tool {} returned: {}", r.name, r.content)))
            .collect();
        Ok(AssistantPatch {
            messages: observations,
            tool_calls: Some(Vec::new()),
            tool_results: Some(results),
            stage: Some(AssistantStage::Thinking),
            ..Default::default()
        })
    }
}
