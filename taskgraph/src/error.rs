//! Execution error types.
//!
//! [`AgentError`] is what LLM clients and step internals return; steps fold it into
//! the state's error field. [`RunError`] is what a whole run returns when the engine
//! itself cannot continue.

use thiserror::Error;

use crate::memory::CheckpointError;

/// Step-internal execution error.
///
/// Returned by `LlmClient::invoke` and by `Node::run` when a node breaks its contract.
/// Ordinary step failures are not returned as `Err`; nodes convert them into a patch
/// with the error field set so the recovery policy can route around them.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, malformed output).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Run-level error: the engine stopped without reaching a terminal state.
///
/// Carries the run id and the index of the last checkpoint that was written, so the
/// caller can inspect or resume from it.
#[derive(Debug, Clone, Error)]
pub enum RunError {
    /// A node returned `Err`, panicked, routed to an undeclared or unknown step, or the
    /// recovery policy left the error set.
    #[error("run {run_id} halted at '{node_id}' (last checkpoint {last_checkpoint:?}): {message}")]
    Fatal {
        run_id: String,
        node_id: String,
        last_checkpoint: Option<u64>,
        message: String,
    },

    /// The run executed more iterations than `EngineConfig::max_steps` allows.
    #[error("run {run_id} exceeded the step limit of {limit} (last checkpoint {last_checkpoint:?})")]
    StepLimit {
        run_id: String,
        limit: usize,
        last_checkpoint: Option<u64>,
    },

    /// Appending to the checkpoint log failed while the run was executing.
    #[error("run {run_id} could not record a checkpoint (last checkpoint {last_checkpoint:?}): {source}")]
    CheckpointWrite {
        run_id: String,
        last_checkpoint: Option<u64>,
        #[source]
        source: CheckpointError,
    },

    /// Reading the checkpoint log failed before a run started (e.g. a resume target).
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl RunError {
    /// Run id the error belongs to, when known.
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::Fatal { run_id, .. }
            | Self::StepLimit { run_id, .. }
            | Self::CheckpointWrite { run_id, .. } => Some(run_id),
            Self::Checkpoint(_) => None,
        }
    }

    /// Index of the last checkpoint persisted before the failure.
    pub fn last_checkpoint(&self) -> Option<u64> {
        match self {
            Self::Fatal {
                last_checkpoint, ..
            }
            | Self::StepLimit {
                last_checkpoint, ..
            }
            | Self::CheckpointWrite {
                last_checkpoint, ..
            } => *last_checkpoint,
            Self::Checkpoint(_) => None,
        }
    }
}
