//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the static step table is inconsistent.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// A node id in an edge or the entry point was not registered via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// `add_node` was called twice with the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// A node uses a reserved id (`__start__`, `__end__`, `__recovery__`).
    #[error("node id is reserved: {0}")]
    ReservedId(String),

    /// `set_entry_point` was never called.
    #[error("graph has no entry point")]
    MissingEntry,

    /// A registered node declares no outgoing routes.
    #[error("node '{0}' declares no routes")]
    NoRoutes(String),

    /// No recovery policy was configured with `with_recovery`.
    #[error("graph has no recovery policy")]
    MissingRecoveryPolicy,
}
