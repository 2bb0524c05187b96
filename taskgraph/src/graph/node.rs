//! Node trait: one step of the graph.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::state::GraphState;

use super::RunContext;

/// One agent step: reads the current state, returns a partial update.
///
/// A node is total over well-formed state. When its own work fails (LLM error, tool
/// failure, bad output) it still returns `Ok(patch)` with the state's error field set
/// and whatever partial artifact it already produced; the engine then routes to the
/// recovery policy. `Err` means the node broke its contract and halts the run.
///
/// **Interaction**: Registered with `StateGraph::add_node`; driven by `CompiledStateGraph`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: GraphState,
{
    /// Node id, matching the id it is registered under.
    fn id(&self) -> &str;

    async fn run(&self, state: &S) -> Result<S::Patch, AgentError>;

    /// Like `run`, with the run id and checkpoint position available. The engine always
    /// calls this; the default ignores the context.
    async fn run_with_context(&self, state: &S, _ctx: &RunContext) -> Result<S::Patch, AgentError> {
        self.run(state).await
    }
}
