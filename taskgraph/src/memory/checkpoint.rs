//! Checkpoint and metadata types.
//!
//! A checkpoint is an immutable snapshot of the full state after one engine iteration,
//! keyed by `(run_id, index)`. Indices start at 0 and are contiguous per run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What produced a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckpointSource {
    /// Index 0 of a fresh run: the caller's input state.
    Input,
    /// Index 0 of a resumed run: copied from `run_id` at `index`.
    Fork { run_id: String, index: u64 },
    /// After a node step was merged.
    Loop,
    /// After a recovery patch was merged.
    Recovery,
}

/// Metadata for a single checkpoint (source and producing node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Node id whose patch produced this snapshot; `None` for index 0.
    pub node: Option<String>,
}

impl CheckpointMetadata {
    pub fn input() -> Self {
        Self {
            source: CheckpointSource::Input,
            node: None,
        }
    }

    pub fn fork(run_id: impl Into<String>, index: u64) -> Self {
        Self {
            source: CheckpointSource::Fork {
                run_id: run_id.into(),
                index,
            },
            node: None,
        }
    }

    pub fn step(node: impl Into<String>) -> Self {
        Self {
            source: CheckpointSource::Loop,
            node: Some(node.into()),
        }
    }

    pub fn recovery(node: impl Into<String>) -> Self {
        Self {
            source: CheckpointSource::Recovery,
            node: Some(node.into()),
        }
    }
}

/// One checkpoint: state snapshot plus identity, timestamp and metadata.
///
/// **Interaction**: Written by the engine through `Checkpointer::append`; read back by
/// `Checkpointer::history` / `get` and by `TimeTravel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub run_id: String,
    pub index: u64,
    pub state: S,
    pub created_at: DateTime<Utc>,
    pub metadata: CheckpointMetadata,
}
