//! Writer: drafts the article from the research notes, and revises on feedback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::artifact::ArtifactStore;
use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;

use super::prompts::{self, fill};
use super::{artifact_name, ask, save_artifact, ArticlePatch, ArticleState, Role, Stage};

pub struct WriterNode {
    llm: Arc<dyn LlmClient>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
}

impl WriterNode {
    pub fn new(llm: Arc<dyn LlmClient>, artifacts: Option<Arc<dyn ArtifactStore>>) -> Self {
        Self { llm, artifacts }
    }

    fn prompt(state: &ArticleState) -> String {
        let summary = if state.research_summary.trim().is_empty() {
            "(no research notes available)"
        } else {
            state.research_summary.as_str()
        };
        let mut prompt = fill(prompts::WRITE, &[("task", &state.task), ("summary", summary)]);
        if state.revision_count > 0 && !state.draft.is_empty() {
            prompt.push_str(&fill(
                prompts::REVISE,
                &[("feedback", &state.feedback), ("draft", &state.draft)],
            ));
        }
        prompt
    }
}

#[async_trait]
impl Node<ArticleState> for WriterNode {
    fn id(&self) -> &str {
        Role::Writer.as_str()
    }

    async fn run(&self, state: &ArticleState) -> Result<ArticlePatch, AgentError> {
        let draft = match ask(self.llm.as_ref(), Self::prompt(state), state.task.clone()).await {
            Ok(d) if !d.is_empty() => d,
            Ok(_) => return Ok(ArticlePatch::failed("writing failed: the model returned an empty draft")),
            Err(e) => return Ok(ArticlePatch::failed(format!("writing failed: {}", e))),
        };
        info!(chars = draft.chars().count(), revision = state.revision_count, "draft written");
        save_artifact(self.artifacts.as_ref(), &artifact_name(&state.task, ""), &draft).await;
        Ok(ArticlePatch {
            messages: vec![Message::assistant(format!(
                "[writer] draft {} ({} chars)",
                state.revision_count,
                draft.chars().count()
            ))],
            draft: Some(draft),
            ..ArticlePatch::goto(Stage::ReviewDraft, Role::Controller)
        })
    }
}
