//! Compiled state graph: the orchestration engine.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. One run is a strictly
//! sequential loop: route, run the node (or the recovery policy), merge the patch,
//! append a checkpoint, emit one event. The loop ends when the router reports the
//! terminal step, the run is cancelled, or the engine hits a fatal condition.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::RunError;
use crate::memory::{CheckpointMetadata, Checkpointer, RunnableConfig};
use crate::state::GraphState;
use crate::stream::StreamEvent;

use super::config::EngineConfig;
use super::logging;
use super::recovery::{RecoveryPolicy, RECOVERY};
use super::route::{route, Route};
use super::{Node, RunContext};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Cancelled,
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct RunOutcome<S> {
    pub run_id: String,
    pub status: RunStatus,
    /// State after the last merged patch.
    pub state: S,
    /// Index of the last checkpoint written for this run.
    pub last_checkpoint: u64,
    /// Iterations executed (node steps plus recoveries).
    pub steps: usize,
}

/// Where checkpoint 0 of a run comes from.
#[derive(Debug, Clone)]
pub(crate) enum Origin {
    Fresh,
    Fork { run_id: String, index: u64 },
}

/// Compiled graph: immutable step table plus checkpointer and limits.
///
/// **Interaction**: `invoke` / `stream` start fresh runs; `TimeTravel` (see
/// [`time_travel`](Self::time_travel)) inspects and resumes recorded ones.
#[derive(Clone)]
pub struct CompiledStateGraph<S: GraphState> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) routes: HashMap<String, HashSet<String>>,
    pub(super) entry: String,
    pub(super) recovery: Arc<dyn RecoveryPolicy<S>>,
    pub(super) checkpointer: Arc<dyn Checkpointer<S>>,
    pub(super) config: EngineConfig,
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<S: GraphState> CompiledStateGraph<S> {
    /// Checkpoint log shared by every run of this graph.
    pub fn checkpointer(&self) -> &Arc<dyn Checkpointer<S>> {
        &self.checkpointer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Entry node id.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Declared route targets of `node_id`, if it is registered.
    pub fn routes_from(&self, node_id: &str) -> Option<&HashSet<String>> {
        self.routes.get(node_id)
    }

    /// Runs the graph to a terminal state, starting at the entry node.
    pub async fn invoke(&self, state: S, config: RunnableConfig) -> Result<RunOutcome<S>, RunError> {
        let run_id = config.resolve_run_id();
        self.execute(run_id, state, Origin::Fresh, config.cancel, None)
            .await
    }

    /// Runs the graph on a background task and streams one event per iteration.
    pub fn stream(&self, state: S, config: RunnableConfig) -> ReceiverStream<StreamEvent<S>> {
        let run_id = config.resolve_run_id();
        self.spawn(run_id, state, Origin::Fresh, config.cancel)
    }

    pub(crate) fn spawn(
        &self,
        run_id: String,
        state: S,
        origin: Origin,
        cancel: CancellationToken,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();

        tokio::spawn(async move {
            if let Err(err) = graph
                .execute(run_id, state, origin, cancel, Some(&tx))
                .await
            {
                let _ = tx.send(StreamEvent::Failed(err)).await;
            }
        });

        ReceiverStream::new(rx)
    }

    pub(crate) async fn execute(
        &self,
        run_id: String,
        state: S,
        origin: Origin,
        cancel: CancellationToken,
        events: Option<&mpsc::Sender<StreamEvent<S>>>,
    ) -> Result<RunOutcome<S>, RunError> {
        let result = self
            .run_loop(run_id, state, origin, cancel, events)
            .await;
        if let Err(err) = &result {
            logging::log_run_error(err);
        }
        result
    }

    async fn run_loop(
        &self,
        run_id: String,
        mut state: S,
        origin: Origin,
        cancel: CancellationToken,
        events: Option<&mpsc::Sender<StreamEvent<S>>>,
    ) -> Result<RunOutcome<S>, RunError> {
        let (metadata, parent, mut next) = match origin {
            Origin::Fresh => (
                CheckpointMetadata::input(),
                None,
                Route::Node(self.entry.clone()),
            ),
            Origin::Fork {
                run_id: source,
                index,
            } => (
                CheckpointMetadata::fork(source.clone(), index),
                Some((source, index)),
                route(&state),
            ),
        };
        let mut last = self
            .checkpointer
            .append(&run_id, &state, metadata)
            .await
            .map_err(|source| RunError::CheckpointWrite {
                run_id: run_id.clone(),
                last_checkpoint: None,
                source,
            })?;
        logging::log_run_start(&run_id, parent.as_ref().map(|(r, i)| (r.as_str(), *i)));
        emit(
            events,
            StreamEvent::Started {
                run_id: run_id.clone(),
                parent,
            },
        )
        .await;

        let fatal = |node_id: &str, last: u64, message: String| RunError::Fatal {
            run_id: run_id.clone(),
            node_id: node_id.to_string(),
            last_checkpoint: Some(last),
            message,
        };

        // Node whose patch produced the current state; None at start and after recovery.
        let mut prev: Option<String> = None;
        let mut steps = 0usize;

        loop {
            if cancel.is_cancelled() {
                logging::log_run_cancelled(&run_id, last);
                emit(
                    events,
                    StreamEvent::Cancelled {
                        run_id: run_id.clone(),
                        last_checkpoint: last,
                    },
                )
                .await;
                return Ok(RunOutcome {
                    run_id,
                    status: RunStatus::Cancelled,
                    state,
                    last_checkpoint: last,
                    steps,
                });
            }

            let node_id = match next {
                Route::End => {
                    logging::log_run_complete(&run_id, last, steps);
                    emit(
                        events,
                        StreamEvent::Completed {
                            run_id: run_id.clone(),
                            last_checkpoint: last,
                            state: state.clone(),
                        },
                    )
                    .await;
                    return Ok(RunOutcome {
                        run_id,
                        status: RunStatus::Completed,
                        state,
                        last_checkpoint: last,
                        steps,
                    });
                }
                Route::Recover => RECOVERY.to_string(),
                Route::Node(id) => id,
            };

            if steps >= self.config.max_steps {
                return Err(RunError::StepLimit {
                    run_id: run_id.clone(),
                    limit: self.config.max_steps,
                    last_checkpoint: Some(last),
                });
            }
            steps += 1;

            let recovering = node_id == RECOVERY;
            let (patch, metadata) = if recovering {
                logging::log_step_failure(
                    &run_id,
                    state.current_step(),
                    state.error().unwrap_or_default(),
                );
                let patch = self.recovery.recover(&state).await;
                (patch, CheckpointMetadata::recovery(RECOVERY))
            } else {
                if let Some(from) = &prev {
                    let declared = self
                        .routes
                        .get(from)
                        .is_some_and(|targets| targets.contains(&node_id));
                    if !declared {
                        return Err(fatal(
                            from,
                            last,
                            format!("undeclared transition '{}' -> '{}'", from, node_id),
                        ));
                    }
                }
                let node = self.nodes.get(&node_id).cloned().ok_or_else(|| {
                    fatal(&node_id, last, format!("unknown node '{}'", node_id))
                })?;
                let ctx = RunContext {
                    run_id: run_id.clone(),
                    node_id: node_id.clone(),
                    checkpoint: last,
                };
                logging::log_node_start(&run_id, &node_id, last);
                let patch = self
                    .run_node(node, &state, &ctx)
                    .await
                    .map_err(|message| fatal(&node_id, last, message))?;
                (patch, CheckpointMetadata::step(node_id.clone()))
            };

            state.apply(patch);
            last = self
                .checkpointer
                .append(&run_id, &state, metadata)
                .await
                .map_err(|source| RunError::CheckpointWrite {
                    run_id: run_id.clone(),
                    last_checkpoint: Some(last),
                    source,
                })?;
            next = route(&state);
            logging::log_state_update(&run_id, &node_id, last, &next);
            emit(
                events,
                StreamEvent::Step {
                    run_id: run_id.clone(),
                    index: last,
                    node_id: node_id.clone(),
                    state: state.clone(),
                },
            )
            .await;

            if recovering && next == Route::Recover {
                return Err(fatal(
                    RECOVERY,
                    last,
                    "recovery policy did not clear the error".to_string(),
                ));
            }
            prev = if recovering { None } else { Some(node_id) };
        }
    }

    /// Runs one node under the step timeout. `Err` carries the fatal reason; a timeout
    /// is not fatal and becomes a failure patch.
    async fn run_node(
        &self,
        node: Arc<dyn Node<S>>,
        state: &S,
        ctx: &RunContext,
    ) -> Result<S::Patch, String> {
        let call = AssertUnwindSafe(node.run_with_context(state, ctx)).catch_unwind();
        let outcome = match self.config.step_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Ok(S::failure(format!(
                        "step '{}' timed out after {:?}",
                        ctx.node_id, limit
                    )))
                }
            },
            None => call.await,
        };
        match outcome {
            Ok(Ok(patch)) => Ok(patch),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(format!("node panicked: {}", panic_message(payload.as_ref()))),
        }
    }
}

async fn emit<S>(events: Option<&mpsc::Sender<StreamEvent<S>>>, event: StreamEvent<S>)
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}
