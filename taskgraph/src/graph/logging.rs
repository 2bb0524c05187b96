//! Logging helpers for graph execution.
//!
//! Structured `tracing` events for run and node lifecycle; the engine calls these so
//! field names stay consistent across runs.

use super::Route;

/// Log run start (fresh or resumed).
pub fn log_run_start(run_id: &str, parent: Option<(&str, u64)>) {
    match parent {
        Some((source, index)) => tracing::info!(
            run_id,
            source_run = source,
            source_index = index,
            "resuming run from checkpoint"
        ),
        None => tracing::info!(run_id, "starting run"),
    }
}

/// Log node execution start.
pub fn log_node_start(run_id: &str, node_id: &str, checkpoint: u64) {
    tracing::debug!(run_id, node_id, checkpoint, "starting node execution");
}

/// Log a merged patch and where the router sends control next.
pub fn log_state_update(run_id: &str, node_id: &str, index: u64, next: &Route) {
    tracing::debug!(run_id, node_id, index, ?next, "state updated");
}

/// Log a step that failed and will be routed to recovery.
pub fn log_step_failure(run_id: &str, step: &str, error: &str) {
    tracing::warn!(run_id, step, error, "step failed; applying recovery policy");
}

/// Log run completion.
pub fn log_run_complete(run_id: &str, last_checkpoint: u64, steps: usize) {
    tracing::info!(run_id, last_checkpoint, steps, "run complete");
}

/// Log a cancelled run.
pub fn log_run_cancelled(run_id: &str, last_checkpoint: u64) {
    tracing::info!(run_id, last_checkpoint, "run cancelled");
}

/// Log a run-level error.
pub fn log_run_error(error: &crate::error::RunError) {
    tracing::error!(%error, "run halted");
}
