//! Time travel: inspect a run's checkpoint history and resume from any checkpoint.
//!
//! Resuming never touches the source run. It starts a new run whose checkpoint 0 is a
//! copy of the chosen snapshot (plus an optional override patch) marked as a fork, and
//! whose first action is the router's decision on that state. With no override that is
//! exactly the decision the source run made after the same checkpoint.

use std::fmt;

use tokio_stream::wrappers::ReceiverStream;

use crate::error::RunError;
use crate::graph::{CompiledStateGraph, Origin, RunOutcome, START};
use crate::memory::{Checkpoint, CheckpointError, CheckpointSource, RunnableConfig};
use crate::state::GraphState;
use crate::stream::StreamEvent;

/// Time-travel controller over a compiled graph's checkpoint log.
///
/// **Interaction**: Obtained from [`CompiledStateGraph::time_travel`]; shares the graph's
/// checkpointer, nodes and limits.
#[derive(Clone)]
pub struct TimeTravel<S: GraphState> {
    graph: CompiledStateGraph<S>,
}

impl<S: GraphState> CompiledStateGraph<S> {
    pub fn time_travel(&self) -> TimeTravel<S> {
        TimeTravel {
            graph: self.clone(),
        }
    }
}

impl<S: GraphState> TimeTravel<S> {
    /// All checkpoints of `run_id` in index order.
    pub async fn history(&self, run_id: &str) -> Result<Vec<Checkpoint<S>>, CheckpointError> {
        self.graph.checkpointer().history(run_id).await
    }

    /// One checkpoint, or `NotFound`.
    pub async fn get(&self, run_id: &str, index: u64) -> Result<Checkpoint<S>, CheckpointError> {
        self.graph.checkpointer().get(run_id, index).await
    }

    /// Run ids known to the checkpointer.
    pub async fn runs(&self) -> Result<Vec<String>, CheckpointError> {
        self.graph.checkpointer().list_runs().await
    }

    /// Resumes from `(run_id, index)` and runs to completion as a new run.
    pub async fn resume(
        &self,
        run_id: &str,
        index: u64,
        state_override: Option<S::Patch>,
        config: RunnableConfig,
    ) -> Result<RunOutcome<S>, RunError> {
        let (new_run, state) = self
            .prepare(run_id, index, state_override, &config)
            .await?;
        let origin = Origin::Fork {
            run_id: run_id.to_string(),
            index,
        };
        self.graph
            .execute(new_run, state, origin, config.cancel, None)
            .await
    }

    /// Like [`resume`](Self::resume) but streams events. Fails before streaming when the
    /// checkpoint does not exist.
    pub async fn resume_stream(
        &self,
        run_id: &str,
        index: u64,
        state_override: Option<S::Patch>,
        config: RunnableConfig,
    ) -> Result<ReceiverStream<StreamEvent<S>>, RunError> {
        let (new_run, state) = self
            .prepare(run_id, index, state_override, &config)
            .await?;
        let origin = Origin::Fork {
            run_id: run_id.to_string(),
            index,
        };
        Ok(self.graph.spawn(new_run, state, origin, config.cancel))
    }

    async fn prepare(
        &self,
        run_id: &str,
        index: u64,
        state_override: Option<S::Patch>,
        config: &RunnableConfig,
    ) -> Result<(String, S), RunError> {
        let checkpoint = self.get(run_id, index).await?;
        let new_run = config.resolve_run_id();
        if self.graph.checkpointer().latest(&new_run).await?.is_some() {
            return Err(RunError::Fatal {
                run_id: new_run,
                node_id: START.to_string(),
                last_checkpoint: None,
                message: "resume needs a run id without existing checkpoints".to_string(),
            });
        }
        let mut state = checkpoint.state;
        if let Some(patch) = state_override {
            state.apply(patch);
        }
        Ok((new_run, state))
    }

    /// Builds a per-checkpoint view of a run for display.
    pub async fn trace(&self, run_id: &str) -> Result<ExecutionTrace, CheckpointError> {
        let history = self.history(run_id).await?;
        Ok(ExecutionTrace::from_history(run_id, &history))
    }
}

/// One row of an [`ExecutionTrace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub index: u64,
    /// Node that produced the checkpoint ("-" for index 0).
    pub node: String,
    /// Active agent after the merge.
    pub agent: String,
    /// Current step after the merge.
    pub step: String,
    pub action: String,
    pub status: String,
}

/// Execution flow of one run: checkpoint rows plus agent hand-offs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTrace {
    pub run_id: String,
    pub rows: Vec<TraceRow>,
    /// Consecutive `(from, to)` changes of the active agent.
    pub transitions: Vec<(String, String)>,
}

impl ExecutionTrace {
    pub fn from_history<S: GraphState>(run_id: &str, history: &[Checkpoint<S>]) -> Self {
        let mut rows: Vec<TraceRow> = Vec::with_capacity(history.len());
        let mut transitions = Vec::new();

        for cp in history {
            let agent = cp.state.active_agent().to_string();
            let step = cp.state.current_step().to_string();
            let prev = rows.last();
            let action = match &cp.metadata.source {
                CheckpointSource::Input => "start".to_string(),
                CheckpointSource::Fork { run_id, index } => format!("fork of {}#{}", run_id, index),
                CheckpointSource::Recovery => format!("recovered -> {}", step),
                CheckpointSource::Loop => match prev {
                    Some(p) if p.step != step => format!("{} -> {}", p.step, step),
                    _ => "continue".to_string(),
                },
            };
            if let Some(p) = prev {
                if p.agent != agent {
                    transitions.push((p.agent.clone(), agent.clone()));
                }
            }
            let status = match cp.state.error() {
                Some(e) if !e.trim().is_empty() => format!("error: {}", e),
                _ => cp.state.describe().unwrap_or_else(|| "-".to_string()),
            };
            rows.push(TraceRow {
                index: cp.index,
                node: cp.metadata.node.clone().unwrap_or_else(|| "-".to_string()),
                agent,
                step,
                action,
                status,
            });
        }

        Self {
            run_id: run_id.to_string(),
            rows,
            transitions,
        }
    }
}

impl fmt::Display for ExecutionTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = ["#", "node", "agent", "step", "action", "status"];
        let cells: Vec<[String; 6]> = self
            .rows
            .iter()
            .map(|r| {
                [
                    r.index.to_string(),
                    r.node.clone(),
                    r.agent.clone(),
                    r.step.clone(),
                    r.action.clone(),
                    r.status.clone(),
                ]
            })
            .collect();
        let mut widths = headers.map(|h| h.chars().count());
        for row in &cells {
            for (w, c) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(c.chars().count());
            }
        }

        writeln!(f, "Execution trace of run {}", self.run_id)?;
        let line = |f: &mut fmt::Formatter<'_>, row: &[String]| -> fmt::Result {
            let padded: Vec<String> = row
                .iter()
                .zip(widths.iter())
                .map(|(c, w)| format!("{:<width$}", c, width = w))
                .collect();
            writeln!(f, "{}", padded.join(" | ").trim_end())
        };
        line(f, &headers.map(str::to_string))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &cells {
            line(f, row)?;
        }

        if !self.transitions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Agent transitions:")?;
            for (from, to) in &self.transitions {
                writeln!(f, "  {} -> {}", from, to)?;
            }
        }
        Ok(())
    }
}
