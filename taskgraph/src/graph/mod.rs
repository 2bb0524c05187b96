//! State graph: nodes, declared routes, router, recovery, compile and run.
//!
//! Build a [`StateGraph`], compile it into a [`CompiledStateGraph`], then `invoke` or
//! `stream` runs. Every iteration is checkpointed; see [`crate::memory::TimeTravel`].

mod compile_error;
mod compiled;
mod config;
pub mod logging;
mod node;
mod recovery;
mod route;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub(crate) use compiled::{panic_message, Origin};
pub use compiled::{CompiledStateGraph, RunOutcome, RunStatus};
pub use config::{EngineConfig, DEFAULT_MAX_STEPS};
pub use node::Node;
pub use recovery::{RecoveryPolicy, RECOVERY};
pub use route::{route, Route};
pub use run_context::RunContext;
pub use state_graph::{StateGraph, END, START};
