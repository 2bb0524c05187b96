//! Error recovery policy contract.

use async_trait::async_trait;

use crate::state::GraphState;

/// Node id recorded in checkpoints and stream events for recovery iterations.
pub const RECOVERY: &str = "__recovery__";

/// Maps a failed state to a recovery patch.
///
/// The returned patch must clear the error and nominate a next step (or mark the run
/// complete). The engine checks this after merging and halts the run if the error
/// survived. Async so a policy can persist a final artifact before completing.
#[async_trait]
pub trait RecoveryPolicy<S>: Send + Sync
where
    S: GraphState,
{
    async fn recover(&self, state: &S) -> S::Patch;
}
