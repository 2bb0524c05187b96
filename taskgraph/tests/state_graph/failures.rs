//! Step failures (routed through recovery) and fatal conditions (halting the run).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use taskgraph::{
    AgentError, Checkpoint, CheckpointError, CheckpointMetadata, CheckpointSource, Checkpointer,
    EngineConfig, MemorySaver, RunError, RunStatus, RunnableConfig, StateGraph, END, RECOVERY,
};

use crate::common::{fail, finish, goto, input, node, Flow, FlowPatch, LeaveError, ResumeAt, SlowNode};

/// a fails, recovery hands to c, c finishes.
fn failing_pipeline() -> StateGraph<Flow> {
    let mut graph = StateGraph::new();
    graph
        .add_node("a", node("a", |_| Ok(fail("a", "search backend down"))))
        .add_node("b", node("b", |_| Ok(goto("b", "c"))))
        .add_node("c", node("c", |_| Ok(finish("c"))))
        .set_entry_point("a")
        .add_edge("a", "b")
        .add_edge("b", "c")
        .add_edge("c", END)
        .with_recovery(Arc::new(ResumeAt("c")));
    graph
}

/// **Scenario**: A failed step is recovered and the run continues where the policy says.
#[tokio::test]
async fn step_failure_routes_through_recovery() {
    let graph = failing_pipeline().compile().unwrap();
    let out = graph
        .invoke(input(), RunnableConfig::with_run_id("f-1"))
        .await
        .unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.visited, vec!["a", "recovery", "c"]);
    assert_eq!(out.state.recoveries, 1);
    assert!(out.state.error.is_none());

    let history = graph.checkpointer().history("f-1").await.unwrap();
    assert_eq!(history[1].state.error.as_deref(), Some("search backend down"));
    assert_eq!(history[2].metadata.source, CheckpointSource::Recovery);
    assert_eq!(history[2].metadata.node.as_deref(), Some(RECOVERY));
}

/// **Scenario**: An error in the patch wins over the next node the patch nominates.
#[tokio::test]
async fn error_takes_priority_over_next_step() {
    let b_runs = Arc::new(AtomicUsize::new(0));
    let counter = b_runs.clone();
    let mut graph = StateGraph::new();
    graph
        .add_node(
            "a",
            node("a", |_| {
                Ok(FlowPatch {
                    next: Some("b".into()),
                    ..fail("a", "boom")
                })
            }),
        )
        .add_node(
            "b",
            node("b", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(finish("b"))
            }),
        )
        .add_node("c", node("c", |_| Ok(finish("c"))))
        .set_entry_point("a")
        .add_edge("a", "b")
        .add_edge("b", END)
        .add_edge("c", END)
        .with_recovery(Arc::new(ResumeAt("c")));
    let out = graph
        .compile()
        .unwrap()
        .invoke(input(), RunnableConfig::default())
        .await
        .unwrap();
    assert_eq!(out.state.visited, vec!["a", "recovery", "c"]);
    assert_eq!(b_runs.load(Ordering::SeqCst), 0);
}

/// **Scenario**: A step over the timeout becomes a step failure, not a fatal error.
#[tokio::test]
async fn step_timeout_is_recoverable() {
    let mut graph = StateGraph::new();
    graph
        .add_node(
            "slow",
            Arc::new(SlowNode {
                id: "slow".into(),
                delay: Duration::from_secs(5),
                to: "c".into(),
            }),
        )
        .add_node("c", node("c", |_| Ok(finish("c"))))
        .set_entry_point("slow")
        .add_edge("slow", "c")
        .add_edge("c", END)
        .with_recovery(Arc::new(ResumeAt("c")))
        .with_config(EngineConfig::default().with_step_timeout(Duration::from_millis(20)));
    let graph = graph.compile().unwrap();
    let out = graph
        .invoke(input(), RunnableConfig::with_run_id("t-1"))
        .await
        .unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.recoveries, 1);
    let failed = graph.checkpointer().get("t-1", 1).await.unwrap();
    assert!(failed.state.error.unwrap().contains("timed out"));
}

/// **Scenario**: A node returning Err halts the run with the last good checkpoint.
#[tokio::test]
async fn node_err_is_fatal() {
    let mut graph = StateGraph::new();
    graph
        .add_node("a", node("a", |_| Ok(goto("a", "b"))))
        .add_node(
            "b",
            node("b", |_| Err(AgentError::ExecutionFailed("contract broken".into()))),
        )
        .set_entry_point("a")
        .add_edge("a", "b")
        .add_edge("b", END)
        .with_recovery(Arc::new(ResumeAt("a")));
    let err = graph
        .compile()
        .unwrap()
        .invoke(input(), RunnableConfig::with_run_id("e-1"))
        .await
        .unwrap_err();
    match err {
        RunError::Fatal {
            run_id,
            node_id,
            last_checkpoint,
            message,
        } => {
            assert_eq!(run_id, "e-1");
            assert_eq!(node_id, "b");
            assert_eq!(last_checkpoint, Some(1));
            assert!(message.contains("contract broken"));
        }
        other => panic!("expected Fatal, got {:?}", other),
    }
}

/// **Scenario**: A panicking node is caught and reported as fatal.
#[tokio::test]
async fn node_panic_is_fatal() {
    let mut graph = StateGraph::new();
    graph
        .add_node("a", node("a", |_| panic!("index out of range")))
        .set_entry_point("a")
        .add_edge("a", END)
        .with_recovery(Arc::new(ResumeAt("a")));
    let err = graph
        .compile()
        .unwrap()
        .invoke(input(), RunnableConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Fatal { ref message, .. } if message.contains("index out of range")));
    assert_eq!(err.last_checkpoint(), Some(0));
}

/// **Scenario**: Routing to a node the previous node did not declare is fatal.
#[tokio::test]
async fn undeclared_transition_is_fatal() {
    let mut graph = StateGraph::new();
    graph
        .add_node("a", node("a", |_| Ok(goto("a", "c"))))
        .add_node("b", node("b", |_| Ok(finish("b"))))
        .add_node("c", node("c", |_| Ok(finish("c"))))
        .set_entry_point("a")
        .add_edge("a", "b")
        .add_edge("b", END)
        .add_edge("c", END)
        .with_recovery(Arc::new(ResumeAt("a")));
    let err = graph
        .compile()
        .unwrap()
        .invoke(input(), RunnableConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Fatal { ref message, .. } if message.contains("'a' -> 'c'")));
}

/// **Scenario**: A policy that leaves the error set is a fatal contract violation.
#[tokio::test]
async fn recovery_must_clear_error() {
    let mut graph = StateGraph::new();
    graph
        .add_node("a", node("a", |_| Ok(fail("a", "boom"))))
        .set_entry_point("a")
        .add_edge("a", END)
        .with_recovery(Arc::new(LeaveError));
    let err = graph
        .compile()
        .unwrap()
        .invoke(input(), RunnableConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Fatal { ref node_id, .. } if node_id == RECOVERY));
    assert_eq!(err.last_checkpoint(), Some(2));
}

/// **Scenario**: A node that keeps routing to itself hits the step limit.
#[tokio::test]
async fn endless_loop_hits_step_limit() {
    let mut graph = StateGraph::new();
    graph
        .add_node("spin", node("spin", |_| Ok(goto("spin", "spin"))))
        .set_entry_point("spin")
        .add_edge("spin", "spin")
        .with_recovery(Arc::new(ResumeAt("spin")))
        .with_config(EngineConfig::default().with_max_steps(5));
    let err = graph
        .compile()
        .unwrap()
        .invoke(input(), RunnableConfig::with_run_id("loop"))
        .await
        .unwrap_err();
    match err {
        RunError::StepLimit {
            limit,
            last_checkpoint,
            ..
        } => {
            assert_eq!(limit, 5);
            assert_eq!(last_checkpoint, Some(5));
        }
        other => panic!("expected StepLimit, got {:?}", other),
    }
}

/// Memory saver whose appends start failing once `capacity` checkpoints are written.
struct FullDisk {
    inner: MemorySaver<Flow>,
    capacity: usize,
    written: AtomicUsize,
}

#[async_trait]
impl Checkpointer<Flow> for FullDisk {
    async fn append(
        &self,
        run_id: &str,
        state: &Flow,
        metadata: CheckpointMetadata,
    ) -> Result<u64, CheckpointError> {
        if self.written.fetch_add(1, Ordering::SeqCst) >= self.capacity {
            return Err(CheckpointError::Storage("disk full".into()));
        }
        self.inner.append(run_id, state, metadata).await
    }

    async fn history(&self, run_id: &str) -> Result<Vec<Checkpoint<Flow>>, CheckpointError> {
        self.inner.history(run_id).await
    }

    async fn get(&self, run_id: &str, index: u64) -> Result<Checkpoint<Flow>, CheckpointError> {
        self.inner.get(run_id, index).await
    }

    async fn list_runs(&self) -> Result<Vec<String>, CheckpointError> {
        self.inner.list_runs().await
    }
}

fn full_disk(capacity: usize) -> Arc<FullDisk> {
    Arc::new(FullDisk {
        inner: MemorySaver::new(),
        capacity,
        written: AtomicUsize::new(0),
    })
}

/// **Scenario**: A checkpoint write failing mid-run reports the run id and the last
/// checkpoint that was written, and that checkpoint can still be read back.
#[tokio::test]
async fn checkpoint_write_failure_keeps_resume_point() {
    let saver = full_disk(2);
    let graph = pipeline_with(saver.clone());
    let err = graph
        .invoke(input(), RunnableConfig::with_run_id("disk"))
        .await
        .unwrap_err();
    match &err {
        RunError::CheckpointWrite {
            run_id,
            last_checkpoint,
            source,
        } => {
            assert_eq!(run_id, "disk");
            assert_eq!(*last_checkpoint, Some(1));
            assert!(matches!(source, CheckpointError::Storage(_)));
        }
        other => panic!("expected CheckpointWrite, got {:?}", other),
    }
    assert_eq!(err.run_id(), Some("disk"));
    let last = saver.get("disk", 1).await.unwrap();
    assert_eq!(last.state.visited, vec!["a"]);
}

/// **Scenario**: When even checkpoint 0 cannot be written there is no resume point.
#[tokio::test]
async fn checkpoint_write_failure_at_start_has_no_resume_point() {
    let graph = pipeline_with(full_disk(0));
    let err = graph
        .invoke(input(), RunnableConfig::with_run_id("disk-0"))
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::CheckpointWrite { .. }), "{:?}", err);
    assert_eq!(err.run_id(), Some("disk-0"));
    assert_eq!(err.last_checkpoint(), None);
}

fn pipeline_with(saver: Arc<FullDisk>) -> taskgraph::CompiledStateGraph<Flow> {
    crate::common::pipeline()
        .compile_with_checkpointer(saver)
        .unwrap()
}
