//! State contract shared by every graph, plus tool call/result records.
//!
//! A graph's state is a typed struct; nodes never mutate it directly. They return a
//! `Patch` and the engine merges it with [`GraphState::apply`], which is where each
//! field's merge rule (overwrite or append) lives.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Shared task state driven by the engine.
///
/// The router reads only [`error`](GraphState::error), [`is_complete`](GraphState::is_complete)
/// and [`active_agent`](GraphState::active_agent); business fields are opaque to it.
pub trait GraphState: Clone + Send + Sync + Debug + 'static {
    /// Partial update returned by a step. Fields left unset persist unchanged.
    type Patch: Clone + Send + Sync + Debug + 'static;

    /// Merges a patch into this state using the per-field merge rules.
    fn apply(&mut self, patch: Self::Patch);

    /// Non-empty error description, if the last step failed.
    fn error(&self) -> Option<&str>;

    /// True once the terminal step marker has been set.
    fn is_complete(&self) -> bool;

    /// Node id nominated to run next.
    fn active_agent(&self) -> &str;

    /// Name of the current logical stage (for logs and traces).
    fn current_step(&self) -> &str;

    /// Patch that records `message` as a step failure without touching anything else.
    /// Used by the engine for step timeouts.
    fn failure(message: String) -> Self::Patch;

    /// Short human-readable status of the artifacts held in this state, shown in
    /// execution traces. `None` when there is nothing worth reporting.
    fn describe(&self) -> Option<String> {
        None
    }
}

/// A tool invocation requested by an LLM turn or a step.
///
/// `id` is the caller-supplied call identifier echoed back in [`ToolResult::call_id`].
/// `arguments` is JSON text as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Outcome of one [`ToolCall`]; failures are rendered into `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}
