//! Full article runs that complete without failures.

use std::sync::Arc;

use taskgraph::article::{Role, Stage};
use taskgraph::{
    route, ArticleSystem, InMemoryArtifactStore, Route, RunStatus, RunnableConfig, StreamEvent,
};
use tokio_stream::StreamExt;

use crate::common::{approving_llm, search_tools, ARTICLE};

/// **Scenario**: "AI trends" goes init -> planning -> research -> reviews -> writing ->
/// final review -> complete, with every artifact persisted.
#[tokio::test]
async fn ai_trends_runs_to_completion() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let system = ArticleSystem::builder(approving_llm())
        .tools(search_tools())
        .artifacts(store.clone())
        .build()
        .unwrap();

    let out = system
        .run("AI trends", RunnableConfig::with_run_id("ai-1"))
        .await
        .unwrap();

    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.current_step, Stage::Complete);
    assert_eq!(out.state.final_output, ARTICLE);
    assert_eq!(
        out.state.final_location.as_deref(),
        Some("memory://ai_trends_final.md")
    );
    assert_eq!(route(&out.state), Route::End);
    assert_eq!(out.state.plan.len(), 3);
    assert_eq!(out.state.search_results.len(), 4);
    assert_eq!(out.state.recovery_count, 0);
    assert_eq!(
        store.names(),
        vec![
            "ai_trends.md",
            "ai_trends_final.md",
            "ai_trends_research.md",
            "ai_trends_review.md"
        ]
    );

    let history = system.time_travel().history("ai-1").await.unwrap();
    let stages: Vec<Stage> = history.iter().map(|c| c.state.current_step).collect();
    assert_eq!(
        stages,
        vec![
            Stage::Init,
            Stage::Planning,
            Stage::Research,
            Stage::ReviewResearch,
            Stage::Writing,
            Stage::ReviewDraft,
            Stage::FinalReview,
            Stage::Complete,
        ]
    );
    let agents: Vec<Role> = history.iter().map(|c| c.state.active_agent).collect();
    assert_eq!(agents[2], Role::Researcher);
    assert_eq!(agents[4], Role::Writer);
    assert_eq!(agents[6], Role::Reviewer);
}

/// **Scenario**: start streams one Step per iteration and ends with Completed.
#[tokio::test]
async fn start_streams_until_completed() {
    let system = ArticleSystem::builder(approving_llm())
        .tools(search_tools())
        .build()
        .unwrap();
    let events: Vec<_> = system
        .start("AI trends", RunnableConfig::default())
        .collect()
        .await;
    let nodes: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Step { node_id, .. } => Some(node_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        nodes,
        vec![
            "controller",
            "controller",
            "researcher",
            "controller",
            "writer",
            "controller",
            "reviewer"
        ]
    );
    assert!(matches!(events.last(), Some(StreamEvent::Completed { state, .. }) if !state.final_output.is_empty()));
}
