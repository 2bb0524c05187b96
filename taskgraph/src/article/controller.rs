//! Controller: analyzes the task, plans, and gates research and drafts.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;

use super::prompts::{self, fill};
use super::verdict::{parse_verdict, strip_verdict, Verdict};
use super::{ask, ArticleConfig, ArticlePatch, ArticleState, Role, Stage};

/// Controller node.
///
/// | stage           | work                          | next                          |
/// |-----------------|-------------------------------|-------------------------------|
/// | init            | resolve and analyze the task  | planning / controller         |
/// | planning        | produce the research plan     | research / researcher         |
/// | review_research | judge the research notes      | research again, or writing    |
/// | review_draft    | judge the draft               | writing again, or final review|
pub struct ControllerNode {
    llm: Arc<dyn LlmClient>,
    config: ArticleConfig,
}

impl ControllerNode {
    pub fn new(llm: Arc<dyn LlmClient>, config: ArticleConfig) -> Self {
        Self { llm, config }
    }

    async fn init(&self, state: &ArticleState) -> ArticlePatch {
        let task = resolve_task(state);
        if task.is_empty() {
            return ArticlePatch::failed("controller: no task provided");
        }
        match ask(self.llm.as_ref(), prompts::ANALYZE.to_string(), task.clone()).await {
            Ok(analysis) => ArticlePatch {
                messages: vec![Message::assistant(format!("[controller] {}", analysis))],
                scratchpad: Some(format!("Task analysis:\n{}", analysis)),
                task: Some(task),
                ..ArticlePatch::goto(Stage::Planning, Role::Controller)
            },
            Err(e) => ArticlePatch {
                task: Some(task),
                ..ArticlePatch::failed(format!("controller failed to analyze the task: {}", e))
            },
        }
    }

    async fn plan(&self, state: &ArticleState) -> ArticlePatch {
        if state.task.trim().is_empty() {
            return ArticlePatch::failed("controller: no task provided");
        }
        let prompt = fill(
            prompts::PLAN,
            &[("task", &state.task), ("analysis", &state.scratchpad)],
        );
        let text = match ask(self.llm.as_ref(), prompt, "Write the plan.").await {
            Ok(text) => text,
            Err(e) => return ArticlePatch::failed(format!("controller failed to plan: {}", e)),
        };
        let plan = parse_plan(&text);
        if plan.is_empty() {
            return ArticlePatch::failed("controller failed to plan: empty plan");
        }
        info!(items = plan.len(), "plan ready");
        ArticlePatch {
            messages: vec![Message::assistant(format!("[controller] plan:\n{}", text))],
            scratchpad: Some(format!("{}\n\nPlan:\n{}", state.scratchpad, text)),
            plan: Some(plan),
            ..ArticlePatch::goto(Stage::Research, Role::Researcher)
        }
    }

    async fn review_research(&self, state: &ArticleState) -> ArticlePatch {
        let prompt = fill(
            prompts::REVIEW_RESEARCH,
            &[("task", &state.task), ("summary", &state.research_summary)],
        );
        let reply = match ask(self.llm.as_ref(), prompt, "Review the research.").await {
            Ok(reply) => reply,
            Err(e) => {
                return ArticlePatch::failed(format!("controller failed to review research: {}", e))
            }
        };
        let parsed = parse_verdict(&reply);
        let again = parsed.verdict == Verdict::Revise
            && state.research_rounds < self.config.max_research_rounds;
        debug!(verdict = ?parsed.verdict, structured = parsed.structured, again, "research reviewed");
        let next = if again {
            ArticlePatch::goto(Stage::Research, Role::Researcher)
        } else {
            ArticlePatch::goto(Stage::Writing, Role::Writer)
        };
        ArticlePatch {
            messages: vec![Message::assistant(format!("[controller] research review:\n{}", reply))],
            verdict: Some(parsed.verdict),
            feedback: Some(strip_verdict(&reply)),
            ..next
        }
    }

    async fn review_draft(&self, state: &ArticleState) -> ArticlePatch {
        let prompt = fill(
            prompts::REVIEW_DRAFT,
            &[("task", &state.task), ("draft", &state.draft)],
        );
        let reply = match ask(self.llm.as_ref(), prompt, "Review the draft.").await {
            Ok(reply) => reply,
            Err(e) => {
                return ArticlePatch::failed(format!("controller failed to review the draft: {}", e))
            }
        };
        let parsed = parse_verdict(&reply);
        let revise =
            parsed.verdict == Verdict::Revise && state.revision_count < self.config.max_revisions;
        debug!(verdict = ?parsed.verdict, revise, revisions = state.revision_count, "draft reviewed");
        let mut patch = if revise {
            ArticlePatch {
                revision_count: Some(state.revision_count + 1),
                ..ArticlePatch::goto(Stage::Writing, Role::Writer)
            }
        } else {
            ArticlePatch::goto(Stage::FinalReview, Role::Reviewer)
        };
        patch.messages = vec![Message::assistant(format!("[controller] draft review:\n{}", reply))];
        let feedback = strip_verdict(&reply);
        patch.scratchpad = Some(format!("{}\n\nDraft feedback:\n{}", state.scratchpad, feedback));
        patch.verdict = Some(parsed.verdict);
        patch.feedback = Some(feedback);
        patch
    }
}

/// The task field, or the latest user message when the field is blank.
fn resolve_task(state: &ArticleState) -> String {
    let task = state.task.trim();
    if !task.is_empty() {
        return task.to_string();
    }
    state
        .messages
        .iter()
        .rev()
        .find_map(|m| match m {
            Message::User(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// One plan item per non-empty line, list markers stripped.
fn parse_plan(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.trim_start_matches(|c: char| matches!(c, '-' | '*' | '•'));
            let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
            let line = match rest.strip_prefix(['.', ')', '、']) {
                Some(item) if rest.len() < line.len() => item,
                _ => line,
            };
            line.trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[async_trait]
impl Node<ArticleState> for ControllerNode {
    fn id(&self) -> &str {
        Role::Controller.as_str()
    }

    async fn run(&self, state: &ArticleState) -> Result<ArticlePatch, AgentError> {
        Ok(match state.current_step {
            Stage::Init => self.init(state).await,
            Stage::Planning => self.plan(state).await,
            Stage::ReviewResearch => self.review_research(state).await,
            Stage::ReviewDraft => self.review_draft(state).await,
            other => {
                debug!(stage = %other, "controller has no work for this stage; restarting");
                ArticlePatch::goto(Stage::Init, Role::Controller)
            }
        })
    }
}
