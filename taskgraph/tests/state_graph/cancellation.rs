//! Cooperative cancellation: honoured between iterations, last checkpoint resumable.

use std::sync::Arc;

use taskgraph::{RunStatus, RunnableConfig, StateGraph, StreamEvent, END};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::common::{finish, goto, input, node, pipeline, Flow, ResumeAt};

#[tokio::test]
async fn cancelled_before_start_stops_at_input() {
    let token = CancellationToken::new();
    token.cancel();
    let graph = pipeline().compile().unwrap();
    let out = graph
        .invoke(input(), RunnableConfig::with_run_id("c-0").with_cancel(token))
        .await
        .unwrap();
    assert_eq!(out.status, RunStatus::Cancelled);
    assert_eq!(out.last_checkpoint, 0);
    assert_eq!(out.steps, 0);
}

/// **Scenario**: Cancelling during a step lets that step finish and checkpoint, then stops;
/// the run can be resumed from its last checkpoint.
#[tokio::test]
async fn cancel_mid_run_then_resume() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let mut graph = StateGraph::new();
    graph
        .add_node("a", node("a", |_| Ok(goto("a", "b"))))
        .add_node(
            "b",
            node("b", move |_| {
                trigger.cancel();
                Ok(goto("b", "c"))
            }),
        )
        .add_node("c", node("c", |_| Ok(finish("c"))))
        .set_entry_point("a")
        .add_edge("a", "b")
        .add_edge("b", "c")
        .add_edge("c", END)
        .with_recovery(Arc::new(ResumeAt("c")));
    let graph = graph.compile().unwrap();

    let events: Vec<StreamEvent<Flow>> = graph
        .stream(input(), RunnableConfig::with_run_id("c-1").with_cancel(token))
        .collect()
        .await;
    match events.last() {
        Some(StreamEvent::Cancelled {
            last_checkpoint, ..
        }) => assert_eq!(*last_checkpoint, 2),
        other => panic!("expected Cancelled, got {:?}", other),
    }

    let resumed = graph
        .time_travel()
        .resume("c-1", 2, None, RunnableConfig::with_run_id("c-1-resumed"))
        .await
        .unwrap();
    assert_eq!(resumed.status, RunStatus::Completed);
    assert_eq!(resumed.state.visited, vec!["a", "b", "c"]);
}
