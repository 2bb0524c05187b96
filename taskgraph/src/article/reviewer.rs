//! Reviewer: final quality pass before the article is published.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::artifact::ArtifactStore;
use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;

use super::prompts::{self, fill};
use super::verdict::{parse_verdict, strip_verdict, Verdict};
use super::{
    artifact_name, ask, finalize, save_artifact, ArticleConfig, ArticlePatch, ArticleState, Role,
    Stage,
};

/// Drafts at or below this many characters are finalized even on a REVISE verdict.
const MIN_REVISABLE_CHARS: usize = 100;

/// Reviewer node: approves and finalizes, or sends the draft back to the writer while
/// revisions remain.
pub struct ReviewerNode {
    llm: Arc<dyn LlmClient>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    config: ArticleConfig,
}

impl ReviewerNode {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        artifacts: Option<Arc<dyn ArtifactStore>>,
        config: ArticleConfig,
    ) -> Self {
        Self {
            llm,
            artifacts,
            config,
        }
    }
}

#[async_trait]
impl Node<ArticleState> for ReviewerNode {
    fn id(&self) -> &str {
        Role::Reviewer.as_str()
    }

    async fn run(&self, state: &ArticleState) -> Result<ArticlePatch, AgentError> {
        let prompt = fill(
            prompts::FINAL_REVIEW,
            &[("task", &state.task), ("draft", &state.draft)],
        );
        let review = match ask(self.llm.as_ref(), prompt, "Review the article.").await {
            Ok(r) => r,
            Err(e) => return Ok(ArticlePatch::failed(format!("final review failed: {}", e))),
        };
        save_artifact(
            self.artifacts.as_ref(),
            &artifact_name(&state.task, "_review"),
            &review,
        )
        .await;

        let parsed = parse_verdict(&review);
        let revise = parsed.verdict == Verdict::Revise
            && state.draft.chars().count() > MIN_REVISABLE_CHARS
            && state.revision_count < self.config.max_revisions;
        debug!(verdict = ?parsed.verdict, revise, "final review done");

        let mut patch = if revise {
            ArticlePatch {
                revision_count: Some(state.revision_count + 1),
                scratchpad: Some(format!(
                    "{}\n\nFinal review feedback:\n{}",
                    state.scratchpad,
                    strip_verdict(&review)
                )),
                feedback: Some(strip_verdict(&review)),
                ..ArticlePatch::goto(Stage::Writing, Role::Writer)
            }
        } else {
            finalize(self.artifacts.as_ref(), state, state.draft.clone()).await
        };
        patch.messages = vec![Message::assistant(format!("[reviewer] {}", review))];
        patch.verdict = Some(parsed.verdict);
        Ok(patch)
    }
}
