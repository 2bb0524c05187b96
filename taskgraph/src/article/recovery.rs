//! Recovery policy for the article workflow.
//!
//! The failed stage name and the error text are matched (lowercased) against small
//! per-stage vocabularies, first match wins. Each recovery bumps `recovery_count`;
//! once `max_recoveries` is reached the run is finalized with whatever it has.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::artifact::ArtifactStore;
use crate::graph::RecoveryPolicy;
use crate::message::Message;
use crate::state::GraphState;

use super::{finalize, ArticlePatch, ArticleState, Role, Stage};

pub const RESEARCH_VOCABULARY: &[&str] = &["research", "search", "研究", "搜索"];
pub const WRITING_VOCABULARY: &[&str] = &["writing", "write", "file", "写作"];
pub const REVIEW_VOCABULARY: &[&str] = &["review", "审核"];

pub const RESEARCH_PLACEHOLDER: &str = "Research data could not be gathered due to a technical \
problem; writing continues from the information available.";
pub const DRAFT_PLACEHOLDER: &str = "A complete draft could not be produced due to a technical \
problem; review continues with this placeholder.";
pub const FINAL_PLACEHOLDER: &str = "The document could not be completed due to a technical \
problem; this is a partial result.";

/// What the policy does with a failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Continue with writing, from a placeholder summary if research produced none.
    ResumeWriting,
    /// Continue with draft review, from a placeholder draft if none exists.
    ResumeDraftReview,
    /// Finalize whatever draft exists and complete the run.
    Finalize,
    /// Start over from planning.
    Replan,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResumeWriting => "resume writing",
            Self::ResumeDraftReview => "resume draft review",
            Self::Finalize => "finalize",
            Self::Replan => "replan",
        })
    }
}

/// Picks the recovery action for a failed state from its stage and error text.
pub fn classify(state: &ArticleState) -> RecoveryAction {
    let context = format!(
        "{} {}",
        state.current_step,
        GraphState::error(state).unwrap_or_default()
    )
    .to_lowercase();
    let hits = |vocab: &[&str]| vocab.iter().any(|w| context.contains(w));
    if hits(RESEARCH_VOCABULARY) {
        RecoveryAction::ResumeWriting
    } else if hits(WRITING_VOCABULARY) {
        RecoveryAction::ResumeDraftReview
    } else if hits(REVIEW_VOCABULARY) {
        RecoveryAction::Finalize
    } else {
        RecoveryAction::Replan
    }
}

/// Article recovery policy.
///
/// **Interaction**: Installed with `StateGraph::with_recovery` by `ArticleSystem`; the
/// finalize action persists `<slug>_final.md` through the same artifact store as the
/// reviewer.
pub struct ArticleRecovery {
    artifacts: Option<Arc<dyn ArtifactStore>>,
    max_recoveries: u32,
}

impl ArticleRecovery {
    pub fn new(artifacts: Option<Arc<dyn ArtifactStore>>, max_recoveries: u32) -> Self {
        Self {
            artifacts,
            max_recoveries,
        }
    }
}

#[async_trait]
impl RecoveryPolicy<ArticleState> for ArticleRecovery {
    async fn recover(&self, state: &ArticleState) -> ArticlePatch {
        let error = GraphState::error(state).unwrap_or_default().to_string();
        let action = if state.recovery_count >= self.max_recoveries {
            RecoveryAction::Finalize
        } else {
            classify(state)
        };
        warn!(
            stage = %state.current_step,
            error = %error,
            action = %action,
            recoveries = state.recovery_count + 1,
            "recovering from step failure"
        );

        let mut patch = match action {
            RecoveryAction::ResumeWriting => ArticlePatch {
                research_summary: state
                    .research_summary
                    .trim()
                    .is_empty()
                    .then(|| RESEARCH_PLACEHOLDER.to_string()),
                ..ArticlePatch::goto(Stage::Writing, Role::Writer)
            },
            RecoveryAction::ResumeDraftReview => ArticlePatch {
                draft: state
                    .draft
                    .trim()
                    .is_empty()
                    .then(|| DRAFT_PLACEHOLDER.to_string()),
                ..ArticlePatch::goto(Stage::ReviewDraft, Role::Controller)
            },
            RecoveryAction::Finalize => {
                let output = if state.draft.trim().is_empty() {
                    FINAL_PLACEHOLDER.to_string()
                } else {
                    state.draft.clone()
                };
                finalize(self.artifacts.as_ref(), state, output).await
            }
            RecoveryAction::Replan => ArticlePatch::goto(Stage::Planning, Role::Controller),
        };
        patch.error = Some(None);
        patch.recovery_count = Some(state.recovery_count + 1);
        patch.messages.push(Message::assistant(format!(
            "[recovery] {} at {}: {}",
            action, state.current_step, error
        )));
        patch
    }
}
