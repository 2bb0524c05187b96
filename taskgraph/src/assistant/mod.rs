//! Tool-calling assistant loop: `assistant` (LLM turn) and `tools` (executor) nodes.
//!
//! The assistant answers or requests tools; the executor runs them and hands the
//! observations back. The loop ends when the assistant answers without tool calls.

mod assistant_node;
mod state;
mod tool_executor;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::graph::{RecoveryPolicy, StateGraph};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::GraphState;
use crate::tool_source::ToolRegistry;

pub use assistant_node::{AssistantNode, DEFAULT_MAX_TURNS};
pub use state::{AssistantPatch, AssistantStage, AssistantState};
pub use tool_executor::ToolExecutorNode;

/// Node id of the LLM turn.
pub const ASSISTANT: &str = "assistant";
/// Node id of the tool executor.
pub const TOOLS: &str = "tools";

/// System prompt for tool-using assistants. Not injected automatically; pass it to
/// [`AssistantState::new`].
pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools. \
Answer directly when you can. Call a tool only when you need information you do not have, \
then use its result in your answer. Do not make up facts.";

/// Ends the conversation with an apology naming the failure.
pub struct AssistantRecovery;

#[async_trait]
impl RecoveryPolicy<AssistantState> for AssistantRecovery {
    async fn recover(&self, state: &AssistantState) -> AssistantPatch {
        let error = state.error().unwrap_or_default().to_string();
        warn!(stage = state.current_step(), error = %error, "assistant loop failed; ending");
        AssistantPatch {
            messages: vec![Message::assistant(format!(
                "Sorry, the request could not be completed: {}",
                error
            ))],
            tool_calls: Some(Vec::new()),
            error: Some(None),
            stage: Some(AssistantStage::Done),
            ..Default::default()
        }
    }
}

/// Builds the assistant/tools loop with [`AssistantRecovery`].
pub fn build_assistant_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    max_turns: u32,
) -> StateGraph<AssistantState> {
    let mut graph = StateGraph::new();
    graph
        .add_node(
            ASSISTANT,
            Arc::new(AssistantNode::new(llm).with_max_turns(max_turns)),
        )
        .add_node(TOOLS, Arc::new(ToolExecutorNode::new(tools)))
        .set_entry_point(ASSISTANT)
        .add_edge(ASSISTANT, TOOLS)
        .add_edge(TOOLS, ASSISTANT)
        .with_recovery(Arc::new(AssistantRecovery));
    graph
}
