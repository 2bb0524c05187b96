//! Streaming types for graph runs.
//!
//! `CompiledStateGraph::stream` and `TimeTravel::resume_stream` emit one
//! [`StreamEvent::Step`] per engine iteration, bracketed by a start event and exactly
//! one terminal event (`Completed`, `Cancelled` or `Failed`).

use std::fmt::Debug;

use crate::error::RunError;

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Checkpoint 0 was written. `parent` is the `(run_id, index)` a resumed run forked from.
    Started {
        run_id: String,
        parent: Option<(String, u64)>,
    },
    /// One iteration finished: `node_id` produced a patch, merged into `state`, persisted
    /// as checkpoint `index`. Recovery iterations use `graph::RECOVERY` as node id.
    Step {
        run_id: String,
        index: u64,
        node_id: String,
        state: S,
    },
    /// The router reached the terminal step.
    Completed {
        run_id: String,
        last_checkpoint: u64,
        state: S,
    },
    /// The run's cancellation token fired; `last_checkpoint` is resumable.
    Cancelled { run_id: String, last_checkpoint: u64 },
    /// The engine could not continue.
    Failed(RunError),
}

impl<S> StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// True for `Completed`, `Cancelled` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Cancelled { .. } | Self::Failed(_)
        )
    }
}
