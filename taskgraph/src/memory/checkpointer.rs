//! Checkpointer trait and error type.
//!
//! A checkpointer owns the append-only checkpoint log of every run. Implementations:
//! [`MemorySaver`](super::MemorySaver) (in-process) and `SqliteSaver` (feature `sqlite`).

use async_trait::async_trait;
use thiserror::Error;

use super::checkpoint::{Checkpoint, CheckpointMetadata};

/// Error returned by checkpoint storage.
#[derive(Debug, Clone, Error)]
pub enum CheckpointError {
    /// No checkpoint exists at `(run_id, index)`.
    #[error("checkpoint not found: run '{run_id}' index {index}")]
    NotFound { run_id: String, index: u64 },

    /// State or metadata could not be encoded or decoded.
    #[error("serialization: {0}")]
    Serialization(String),

    /// The backing store failed.
    #[error("storage: {0}")]
    Storage(String),
}

/// Append-only, per-run checkpoint log.
///
/// Writes for one run id are serialized; writes for different runs may interleave.
/// Checkpoints are never mutated once appended.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Persists a snapshot and returns its index (0 for the first checkpoint of a run).
    async fn append(
        &self,
        run_id: &str,
        state: &S,
        metadata: CheckpointMetadata,
    ) -> Result<u64, CheckpointError>;

    /// All checkpoints of a run ordered by index; empty for an unknown run.
    async fn history(&self, run_id: &str) -> Result<Vec<Checkpoint<S>>, CheckpointError>;

    /// One checkpoint, or `NotFound`.
    async fn get(&self, run_id: &str, index: u64) -> Result<Checkpoint<S>, CheckpointError>;

    /// Highest-index checkpoint of a run.
    async fn latest(&self, run_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        Ok(self.history(run_id).await?.pop())
    }

    /// Run ids that have at least one checkpoint.
    async fn list_runs(&self) -> Result<Vec<String>, CheckpointError>;
}
