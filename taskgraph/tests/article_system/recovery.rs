//! Step failures in article runs and how the recovery policy routes around them.

use std::sync::Arc;

use taskgraph::article::{
    ArticleConfig, Stage, DRAFT_PLACEHOLDER, FINAL_PLACEHOLDER, RESEARCH_PLACEHOLDER,
};
use taskgraph::{ArticleSystem, CheckpointSource, RunStatus, RunnableConfig, ToolRegistry, RECOVERY};

use crate::common::{
    broken_search_tools, calls_in, crashing_search_tools, scripted_llm, search_tools, Phase,
};

/// **Scenario**: Every search failing is recovered into writing with a placeholder summary.
#[tokio::test]
async fn research_tool_failure_continues_with_placeholder() {
    let llm = scripted_llm(|_| None);
    let system = ArticleSystem::builder(llm.clone())
        .tools(broken_search_tools())
        .build()
        .unwrap();
    let out = system
        .run("AI trends", RunnableConfig::with_run_id("r-1"))
        .await
        .unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert!(!out.state.final_output.is_empty());
    assert_eq!(out.state.recovery_count, 1);
    assert!(out.state.search_results.iter().all(|h| h.failed));

    let history = system.time_travel().history("r-1").await.unwrap();
    let failed = history
        .iter()
        .position(|c| c.state.error.is_some())
        .unwrap();
    assert_eq!(history[failed].state.current_step, Stage::Research);
    let recovered = &history[failed + 1];
    assert_eq!(recovered.metadata.source, CheckpointSource::Recovery);
    assert_eq!(recovered.metadata.node.as_deref(), Some(RECOVERY));
    assert_eq!(recovered.state.current_step, Stage::Writing);
    assert_eq!(recovered.state.research_summary, RESEARCH_PLACEHOLDER);
    assert_eq!(calls_in(&llm, Phase::Summarize), 0);
}

/// **Scenario**: A search tool that panics is a research failure, not a halted run.
#[tokio::test]
async fn panicking_search_tool_is_recovered() {
    let system = ArticleSystem::builder(scripted_llm(|_| None))
        .tools(crashing_search_tools())
        .build()
        .unwrap();
    let out = system
        .run("AI trends", RunnableConfig::with_run_id("r-panic"))
        .await
        .unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.research_summary, RESEARCH_PLACEHOLDER);
    assert!(out.state.search_results.iter().all(|h| h.failed));

    let history = system.time_travel().history("r-panic").await.unwrap();
    let failed = history
        .iter()
        .find(|c| c.state.error.is_some())
        .unwrap();
    assert!(
        failed
            .state
            .error
            .as_deref()
            .is_some_and(|e| e.contains("subprocess wrapper crashed")),
        "{:?}",
        failed.state.error
    );
}

/// **Scenario**: With no search tool registered the run still completes.
#[tokio::test]
async fn missing_search_tool_is_recovered() {
    let system = ArticleSystem::builder(scripted_llm(|_| None))
        .tools(Arc::new(ToolRegistry::new()))
        .build()
        .unwrap();
    let out = system.run("AI trends", RunnableConfig::default()).await.unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.research_summary, RESEARCH_PLACEHOLDER);
}

/// **Scenario**: A writer failure is recovered into draft review with a placeholder draft.
#[tokio::test]
async fn writer_failure_continues_with_placeholder_draft() {
    let llm = scripted_llm(|phase| match phase {
        Phase::Write => Some(Err("model overloaded".into())),
        _ => None,
    });
    let system = ArticleSystem::builder(llm)
        .tools(search_tools())
        .build()
        .unwrap();
    let out = system.run("AI trends", RunnableConfig::default()).await.unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.final_output, DRAFT_PLACEHOLDER);
    assert_eq!(out.state.recovery_count, 1);
}

/// **Scenario**: A final review failure finalizes the existing draft.
#[tokio::test]
async fn final_review_failure_finalizes_draft() {
    let llm = scripted_llm(|phase| match phase {
        Phase::FinalReview => Some(Err("timeout".into())),
        _ => None,
    });
    let system = ArticleSystem::builder(llm)
        .tools(search_tools())
        .build()
        .unwrap();
    let out = system.run("AI trends", RunnableConfig::default()).await.unwrap();
    assert_eq!(out.state.final_output, crate::common::ARTICLE);
    assert!(out.state.error.is_none());
}

/// **Scenario**: A model that always fails still terminates: replanning stops at the
/// recovery cap and the run is finalized with a placeholder.
#[tokio::test]
async fn recovery_cap_terminates_failing_runs() {
    let llm = scripted_llm(|_| Some(Err("service down".into())));
    let system = ArticleSystem::builder(llm.clone())
        .tools(search_tools())
        .config(ArticleConfig::default().with_max_recoveries(3))
        .build()
        .unwrap();
    let out = system.run("AI trends", RunnableConfig::default()).await.unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.final_output, FINAL_PLACEHOLDER);
    assert_eq!(out.state.recovery_count, 4);
    assert_eq!(calls_in(&llm, Phase::Analyze), 1);
    assert_eq!(calls_in(&llm, Phase::Plan), 3);
}
