//! Article task state, its patch type and the stage/role enums.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::state::GraphState;

use super::verdict::Verdict;

/// Logical stage of the article workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Init,
    Planning,
    Research,
    ReviewResearch,
    Writing,
    ReviewDraft,
    FinalReview,
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Planning => "planning",
            Self::Research => "research",
            Self::ReviewResearch => "review_research",
            Self::Writing => "writing",
            Self::ReviewDraft => "review_draft",
            Self::FinalReview => "final_review",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agent role; each role is one graph node with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Controller,
    Researcher,
    Writer,
    Reviewer,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Controller, Self::Researcher, Self::Writer, Self::Reviewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Researcher => "researcher",
            Self::Writer => "writer",
            Self::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search request and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub query: String,
    /// Result text, or the error text when `failed`.
    pub result: String,
    #[serde(default)]
    pub failed: bool,
}

/// Shared state of one article run.
///
/// Merge rules: `messages` appends; every other field overwrites when set in the patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleState {
    pub messages: Vec<Message>,
    pub task: String,
    /// Controller notes: task analysis, plan text, review feedback.
    pub scratchpad: String,
    pub plan: Vec<String>,
    pub search_results: Vec<SearchHit>,
    pub research_summary: String,
    pub draft: String,
    /// Latest review feedback handed to the writer on revisions.
    pub feedback: String,
    pub final_output: String,
    /// Where the final output was persisted, when an artifact store is configured.
    pub final_location: Option<String>,
    pub error: Option<String>,
    pub current_step: Stage,
    pub active_agent: Role,
    pub verdict: Option<Verdict>,
    pub revision_count: u32,
    pub research_rounds: u32,
    pub recovery_count: u32,
}

/// Partial update to [`ArticleState`]; `None` leaves a field unchanged.
///
/// `error: Some(None)` clears the error, `Some(Some(msg))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticlePatch {
    /// Appended to `messages`.
    pub messages: Vec<Message>,
    pub task: Option<String>,
    pub scratchpad: Option<String>,
    pub plan: Option<Vec<String>>,
    pub search_results: Option<Vec<SearchHit>>,
    pub research_summary: Option<String>,
    pub draft: Option<String>,
    pub feedback: Option<String>,
    pub final_output: Option<String>,
    pub final_location: Option<String>,
    pub error: Option<Option<String>>,
    pub current_step: Option<Stage>,
    pub active_agent: Option<Role>,
    pub verdict: Option<Verdict>,
    pub revision_count: Option<u32>,
    pub research_rounds: Option<u32>,
    pub recovery_count: Option<u32>,
}

impl ArticlePatch {
    /// Patch that only moves to `stage` with `role` active.
    pub fn goto(stage: Stage, role: Role) -> Self {
        Self {
            current_step: Some(stage),
            active_agent: Some(role),
            ..Default::default()
        }
    }

    /// Step-failure patch; stage and agent stay where the failure happened.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(Some(message.into())),
            ..Default::default()
        }
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

impl GraphState for ArticleState {
    type Patch = ArticlePatch;

    fn apply(&mut self, patch: ArticlePatch) {
        self.messages.extend(patch.messages);
        set(&mut self.task, patch.task);
        set(&mut self.scratchpad, patch.scratchpad);
        set(&mut self.plan, patch.plan);
        set(&mut self.search_results, patch.search_results);
        set(&mut self.research_summary, patch.research_summary);
        set(&mut self.draft, patch.draft);
        set(&mut self.feedback, patch.feedback);
        set(&mut self.final_output, patch.final_output);
        if patch.final_location.is_some() {
            self.final_location = patch.final_location;
        }
        if let Some(error) = patch.error {
            self.error = error.filter(|e| !e.trim().is_empty());
        }
        set(&mut self.current_step, patch.current_step);
        set(&mut self.active_agent, patch.active_agent);
        if patch.verdict.is_some() {
            self.verdict = patch.verdict;
        }
        set(&mut self.revision_count, patch.revision_count);
        set(&mut self.research_rounds, patch.research_rounds);
        set(&mut self.recovery_count, patch.recovery_count);
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }

    fn is_complete(&self) -> bool {
        self.current_step == Stage::Complete
    }

    fn active_agent(&self) -> &str {
        self.active_agent.as_str()
    }

    fn current_step(&self) -> &str {
        self.current_step.as_str()
    }

    fn failure(message: String) -> ArticlePatch {
        ArticlePatch::failed(message)
    }

    fn describe(&self) -> Option<String> {
        if !self.final_output.is_empty() {
            return Some(match &self.final_location {
                Some(loc) => format!("final saved to {}", loc),
                None => format!("final ({} chars)", self.final_output.chars().count()),
            });
        }
        if !self.draft.is_empty() {
            return Some(format!(
                "draft {} chars, {} revision(s)",
                self.draft.chars().count(),
                self.revision_count
            ));
        }
        if !self.research_summary.is_empty() {
            return Some(format!(
                "research {} chars from {} search(es)",
                self.research_summary.chars().count(),
                self.search_results.len()
            ));
        }
        if !self.plan.is_empty() {
            return Some(format!("plan with {} item(s)", self.plan.len()));
        }
        None
    }
}
