//! In-memory checkpointer.
//!
//! One append-only `Vec` per run id inside a `DashMap`; the shard lock on a run's
//! entry serializes its writers while other runs proceed independently.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::checkpoint::{Checkpoint, CheckpointMetadata};
use super::checkpointer::{CheckpointError, Checkpointer};

/// In-memory checkpointer for tests and single-process use. Not persistent.
pub struct MemorySaver<S> {
    runs: DashMap<String, Vec<Checkpoint<S>>>,
}

impl<S> MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            runs: DashMap::new(),
        }
    }
}

impl<S> Default for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn append(
        &self,
        run_id: &str,
        state: &S,
        metadata: CheckpointMetadata,
    ) -> Result<u64, CheckpointError> {
        let mut log = self.runs.entry(run_id.to_string()).or_default();
        let index = log.len() as u64;
        log.push(Checkpoint {
            run_id: run_id.to_string(),
            index,
            state: state.clone(),
            created_at: Utc::now(),
            metadata,
        });
        Ok(index)
    }

    async fn history(&self, run_id: &str) -> Result<Vec<Checkpoint<S>>, CheckpointError> {
        Ok(self
            .runs
            .get(run_id)
            .map(|log| log.clone())
            .unwrap_or_default())
    }

    async fn get(&self, run_id: &str, index: u64) -> Result<Checkpoint<S>, CheckpointError> {
        self.runs
            .get(run_id)
            .and_then(|log| log.get(index as usize).cloned())
            .ok_or_else(|| CheckpointError::NotFound {
                run_id: run_id.to_string(),
                index,
            })
    }

    async fn latest(&self, run_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        Ok(self.runs.get(run_id).and_then(|log| log.last().cloned()))
    }

    async fn list_runs(&self) -> Result<Vec<String>, CheckpointError> {
        let mut ids: Vec<String> = self.runs.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}
