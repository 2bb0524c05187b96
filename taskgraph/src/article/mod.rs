//! Article-writing team: controller, researcher, writer and reviewer over one shared
//! [`ArticleState`].
//!
//! The controller plans and gates each phase; the researcher gathers search results
//! through the tool registry; the writer drafts; the reviewer does the final pass.
//! Failures are recorded in state and handled by [`ArticleRecovery`]. Build and run
//! the whole team with [`ArticleSystem`].

mod config;
mod controller;
pub mod prompts;
mod recovery;
mod researcher;
mod reviewer;
mod state;
mod system;
mod verdict;
mod writer;

use std::sync::Arc;

use tracing::warn;

use crate::artifact::{slugify, ArtifactStore};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;

pub use config::ArticleConfig;
pub use controller::ControllerNode;
pub use recovery::{
    classify, ArticleRecovery, RecoveryAction, DRAFT_PLACEHOLDER, FINAL_PLACEHOLDER,
    RESEARCH_PLACEHOLDER, RESEARCH_VOCABULARY, REVIEW_VOCABULARY, WRITING_VOCABULARY,
};
pub use researcher::ResearcherNode;
pub use reviewer::ReviewerNode;
pub use state::{ArticlePatch, ArticleState, Role, SearchHit, Stage};
pub use system::{build_article_graph, initial_state, ArticleSystem, ArticleSystemBuilder};
pub use verdict::{parse_verdict, strip_verdict, ParsedVerdict, Verdict, REVISION_KEYWORDS};
pub use writer::WriterNode;

/// One system+user turn; returns the trimmed reply text.
pub(crate) async fn ask(
    llm: &dyn LlmClient,
    system: String,
    user: impl Into<String>,
) -> Result<String, AgentError> {
    let reply = llm
        .invoke(&[Message::system(system), Message::user(user)])
        .await?;
    Ok(reply.content.trim().to_string())
}

/// Artifact name `<slug of task><suffix>.md`.
pub(crate) fn artifact_name(task: &str, suffix: &str) -> String {
    format!("{}{}.md", slugify(task), suffix)
}

/// Stores an artifact when a store is configured. Storage failures are logged and do
/// not fail the step.
pub(crate) async fn save_artifact(
    store: Option<&Arc<dyn ArtifactStore>>,
    name: &str,
    content: &str,
) -> Option<String> {
    let store = store?;
    match store.store(name, content).await {
        Ok(location) => Some(location),
        Err(e) => {
            warn!(artifact = name, error = %e, "artifact not saved");
            None
        }
    }
}

/// Completes the run with `output` as the final document, saved as `<slug>_final.md`.
pub(crate) async fn finalize(
    store: Option<&Arc<dyn ArtifactStore>>,
    state: &ArticleState,
    output: String,
) -> ArticlePatch {
    let location = save_artifact(store, &artifact_name(&state.task, "_final"), &output).await;
    tracing::info!(location = location.as_deref().unwrap_or("-"), "article finalized");
    ArticlePatch {
        final_output: Some(output),
        final_location: location,
        ..ArticlePatch::goto(Stage::Complete, Role::Controller)
    }
}
