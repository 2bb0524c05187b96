//! Researcher: runs searches through the tool registry and summarizes them.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::artifact::ArtifactStore;
use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::tool_source::ToolRegistry;

use super::prompts::{self, fill};
use super::{
    artifact_name, ask, save_artifact, ArticleConfig, ArticlePatch, ArticleState, Role,
    SearchHit, Stage,
};

/// Researcher node.
///
/// Searches the primary query plus up to `max_subqueries` plan items not searched in
/// earlier rounds, concurrently. A short primary result triggers one follow-up search.
/// Individual search failures are kept as failed hits; the step fails only when every
/// search in the round failed or the summary could not be produced.
pub struct ResearcherNode {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    config: ArticleConfig,
}

impl ResearcherNode {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
        artifacts: Option<Arc<dyn ArtifactStore>>,
        config: ArticleConfig,
    ) -> Self {
        Self {
            llm,
            tools,
            artifacts,
            config,
        }
    }

    fn queries(&self, state: &ArticleState) -> Vec<String> {
        let searched = |q: &str| state.search_results.iter().any(|h| h.query == q);
        let mut queries = Vec::new();
        let primary = format!("{} research", state.task);
        if !searched(&primary) {
            queries.push(primary);
        }
        queries.extend(
            state
                .plan
                .iter()
                .map(|item| format!("{} {}", state.task, item))
                .filter(|q| !searched(q))
                .take(self.config.max_subqueries),
        );
        if queries.is_empty() {
            queries.push(format!(
                "{} in depth (round {})",
                state.task,
                state.research_rounds + 1
            ));
        }
        queries
    }

    async fn search(&self, queries: Vec<String>) -> Vec<SearchHit> {
        let args = queries.iter().map(|q| json!({ "query": q })).collect();
        let results = self
            .tools
            .invoke_batch(&self.config.search_tool, args, self.config.search_concurrency)
            .await;
        queries
            .into_iter()
            .zip(results)
            .map(|(query, result)| match result {
                Ok(value) => SearchHit {
                    query,
                    result: value_text(value),
                    failed: false,
                },
                Err(e) => SearchHit {
                    query,
                    result: e.to_string(),
                    failed: true,
                },
            })
            .collect()
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}

fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| {
            if h.failed {
                format!("## {}\n(search failed: {})", h.query, h.result)
            } else {
                format!("## {}\n{}", h.query, h.result)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Node<ArticleState> for ResearcherNode {
    fn id(&self) -> &str {
        Role::Researcher.as_str()
    }

    async fn run(&self, state: &ArticleState) -> Result<ArticlePatch, AgentError> {
        let mut hits = self.search(self.queries(state)).await;

        let thin_primary = hits
            .first()
            .is_some_and(|h| !h.failed && h.result.chars().count() < self.config.min_result_chars);
        if thin_primary {
            let follow_up = format!("{} detailed analysis", state.task);
            if !state.search_results.iter().any(|h| h.query == follow_up) {
                hits.extend(self.search(vec![follow_up]).await);
            }
        }

        let failed = hits.iter().filter(|h| h.failed).count();
        info!(searches = hits.len(), failed, "research round done");
        let mut all = state.search_results.clone();
        all.extend(hits.iter().cloned());

        if failed == hits.len() {
            let reason = hits.first().map(|h| h.result.as_str()).unwrap_or("no searches");
            return Ok(ArticlePatch {
                search_results: Some(all),
                ..ArticlePatch::failed(format!("research failed: every search failed ({})", reason))
            });
        }
        if failed > 0 {
            warn!(failed, "some searches failed; summarizing the rest");
        }

        let ok_hits: Vec<SearchHit> = all.iter().filter(|h| !h.failed).cloned().collect();
        let prompt = fill(
            prompts::RESEARCH_SUMMARY,
            &[("task", &state.task), ("results", &render_hits(&ok_hits))],
        );
        let summary = match ask(self.llm.as_ref(), prompt, "Summarize the research.").await {
            Ok(s) if !s.is_empty() => s,
            Ok(_) => {
                return Ok(ArticlePatch {
                    search_results: Some(all),
                    ..ArticlePatch::failed("research summary was empty")
                })
            }
            Err(e) => {
                return Ok(ArticlePatch {
                    search_results: Some(all),
                    ..ArticlePatch::failed(format!("research summary failed: {}", e))
                })
            }
        };

        let notes = format!("{}\n\n# Sources\n\n{}", summary, render_hits(&all));
        save_artifact(
            self.artifacts.as_ref(),
            &artifact_name(&state.task, "_research"),
            &notes,
        )
        .await;

        Ok(ArticlePatch {
            messages: vec![Message::assistant(format!(
                "[researcher] {} search(es), {} failed",
                hits.len(),
                failed
            ))],
            search_results: Some(all),
            research_summary: Some(summary),
            research_rounds: Some(state.research_rounds + 1),
            ..ArticlePatch::goto(Stage::ReviewResearch, Role::Controller)
        })
    }
}
