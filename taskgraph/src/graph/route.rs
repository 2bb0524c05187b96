//! Router: pure decision of what the engine does next.

use crate::state::GraphState;

/// Where control goes after a state merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The state carries an error; apply the recovery policy.
    Recover,
    /// Terminal step reached.
    End,
    /// Run the named node.
    Node(String),
}

/// Routes on the state alone: a non-empty error wins, then the terminal marker,
/// then the active agent. Never looks at business fields.
pub fn route<S: GraphState>(state: &S) -> Route {
    if state.error().is_some_and(|e| !e.trim().is_empty()) {
        return Route::Recover;
    }
    if state.is_complete() {
        return Route::End;
    }
    Route::Node(state.active_agent().to_string())
}
