//! invoke: runs to completion and the checkpoint log they leave.

use taskgraph::{CheckpointSource, RunStatus, RunnableConfig};

use crate::common::{input, pipeline};

/// **Scenario**: a -> b -> c completes with one checkpoint per iteration plus the input.
#[tokio::test]
async fn invoke_runs_pipeline_to_end() {
    let graph = pipeline().compile().unwrap();
    let out = graph
        .invoke(input(), RunnableConfig::with_run_id("run-1"))
        .await
        .unwrap();

    assert_eq!(out.run_id, "run-1");
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.visited, vec!["a", "b", "c"]);
    assert_eq!(out.steps, 3);
    assert_eq!(out.last_checkpoint, 3);

    let history = graph.checkpointer().history("run-1").await.unwrap();
    let indices: Vec<u64> = history.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(history[0].metadata.source, CheckpointSource::Input);
    assert!(history[0].state.visited.is_empty());
    let nodes: Vec<_> = history[1..]
        .iter()
        .map(|c| c.metadata.node.clone().unwrap_or_default())
        .collect();
    assert_eq!(nodes, vec!["a", "b", "c"]);
    assert!(history[1..]
        .iter()
        .all(|c| c.metadata.source == CheckpointSource::Loop));
}

/// **Scenario**: A run without a run id gets a generated one.
#[tokio::test]
async fn invoke_generates_run_id() {
    let graph = pipeline().compile().unwrap();
    let out = graph.invoke(input(), RunnableConfig::default()).await.unwrap();
    assert!(!out.run_id.is_empty());
    let runs = graph.checkpointer().list_runs().await.unwrap();
    assert_eq!(runs, vec![out.run_id]);
}

/// **Scenario**: Concurrent runs share the checkpointer without mixing their logs.
#[tokio::test]
async fn concurrent_runs_keep_separate_logs() {
    let graph = pipeline().compile().unwrap();
    let runs = (0..8).map(|i| {
        let graph = graph.clone();
        async move {
            graph
                .invoke(input(), RunnableConfig::with_run_id(format!("run-{}", i)))
                .await
        }
    });
    let outcomes = futures::future::join_all(runs).await;
    for (i, out) in outcomes.into_iter().enumerate() {
        let out = out.unwrap();
        let history = graph.checkpointer().history(&out.run_id).await.unwrap();
        assert_eq!(history.len(), 4, "run-{}", i);
        assert!(history.iter().enumerate().all(|(k, c)| c.index == k as u64));
    }
}
