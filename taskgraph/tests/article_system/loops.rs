//! Loops in the article workflow and the caps that bound them.

use std::sync::atomic::{AtomicUsize, Ordering};

use taskgraph::article::{ArticleConfig, Verdict};
use taskgraph::{ArticleSystem, RunStatus, RunnableConfig};

use crate::common::{calls_in, phase_of, scripted_llm, search_tools, Phase, ARTICLE};

/// **Scenario**: Reviews that always ask for changes stop at max_revisions and the run
/// still completes with the last draft.
#[tokio::test]
async fn revisions_are_capped() {
    let llm = scripted_llm(|phase| match phase {
        Phase::ReviewDraft | Phase::FinalReview => {
            Some(Ok("The draft needs improvement.\nVERDICT: REVISE".into()))
        }
        _ => None,
    });
    let system = ArticleSystem::builder(llm.clone())
        .tools(search_tools())
        .config(ArticleConfig::default().with_max_revisions(2))
        .build()
        .unwrap();
    let out = system.run("AI trends", RunnableConfig::default()).await.unwrap();

    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.revision_count, 2);
    assert_eq!(out.state.final_output, ARTICLE);
    assert_eq!(out.state.verdict, Some(Verdict::Revise));
    assert_eq!(calls_in(&llm, Phase::Write), 3);
    assert_eq!(calls_in(&llm, Phase::FinalReview), 1);
}

/// **Scenario**: The final reviewer can send a draft back once; the second pass approves.
#[tokio::test]
async fn final_review_sends_back_to_writer() {
    let reviews = AtomicUsize::new(0);
    let llm_once = scripted_llm(move |phase| match phase {
        Phase::FinalReview => {
            let n = reviews.fetch_add(1, Ordering::SeqCst);
            (n == 0).then(|| Ok("Add a conclusion.\nVERDICT: REVISE".into()))
        }
        _ => None,
    });
    let system = ArticleSystem::builder(llm_once.clone())
        .tools(search_tools())
        .build()
        .unwrap();
    let out = system.run("AI trends", RunnableConfig::default()).await.unwrap();
    assert_eq!(out.state.revision_count, 1);
    assert_eq!(calls_in(&llm_once, Phase::Write), 2);
    assert_eq!(calls_in(&llm_once, Phase::FinalReview), 2);
    let revise_prompt = llm_once
        .calls()
        .into_iter()
        .filter(|m| phase_of(m) == Phase::Write)
        .nth(1)
        .unwrap();
    assert!(revise_prompt[0].content().contains("Add a conclusion."));
}

/// **Scenario**: Research deemed insufficient is redone until max_research_rounds, with
/// new queries each round.
#[tokio::test]
async fn research_rounds_are_capped() {
    let llm = scripted_llm(|phase| match phase {
        Phase::ReviewResearch => Some(Ok("Research is insufficient.".into())),
        _ => None,
    });
    let system = ArticleSystem::builder(llm.clone())
        .tools(search_tools())
        .config(ArticleConfig::default().with_max_research_rounds(2))
        .build()
        .unwrap();
    let out = system.run("AI trends", RunnableConfig::default()).await.unwrap();
    assert_eq!(out.status, RunStatus::Completed);
    assert_eq!(out.state.research_rounds, 2);
    assert_eq!(calls_in(&llm, Phase::Summarize), 2);
    let mut queries: Vec<&str> = out
        .state
        .search_results
        .iter()
        .map(|h| h.query.as_str())
        .collect();
    let total = queries.len();
    queries.sort();
    queries.dedup();
    assert_eq!(queries.len(), total);
}
