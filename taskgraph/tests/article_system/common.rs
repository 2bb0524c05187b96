//! Scripted LLM and tools for article runs.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use taskgraph::{AgentError, LlmResponse, Message, MockLlm, ToolRegistry, ToolSpec};

/// Which prompt an LLM call belongs to, read from its system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Analyze,
    Plan,
    Summarize,
    ReviewResearch,
    Write,
    ReviewDraft,
    FinalReview,
    Unknown,
}

pub fn phase_of(messages: &[Message]) -> Phase {
    let system = messages.first().map(|m| m.content()).unwrap_or_default();
    if system.contains("Analyze the task below") {
        Phase::Analyze
    } else if system.contains("planning an article") {
        Phase::Plan
    } else if system.contains("research analyst") {
        Phase::Summarize
    } else if system.contains("Judge whether the research notes") {
        Phase::ReviewResearch
    } else if system.contains("professional writer") {
        Phase::Write
    } else if system.contains("reviewing a draft") {
        Phase::ReviewDraft
    } else if system.contains("final reviewer") {
        Phase::FinalReview
    } else {
        Phase::Unknown
    }
}

pub const ARTICLE: &str = "# AI trends\n\nFoundation models keep growing while smaller, \
specialised models win on cost. Agents that call tools are moving from demos to production, \
and regulation is catching up on both sides of the Atlantic.";

/// Default reply per phase: everything approves.
pub fn default_reply(phase: Phase) -> String {
    match phase {
        Phase::Analyze => "Audience: curious non-experts. Cover the state of the art.".into(),
        Phase::Plan => "1. Model scaling\n2. Agents\n3. Regulation".into(),
        Phase::Summarize => "Notes: scaling continues; agents in production; new rules.".into(),
        Phase::ReviewResearch | Phase::ReviewDraft | Phase::FinalReview => {
            "Looks solid.\nVERDICT: APPROVE".into()
        }
        Phase::Write => ARTICLE.into(),
        Phase::Unknown => "ok".into(),
    }
}

/// LLM that answers per phase; `overrides` may replace any reply or fail it.
pub fn scripted_llm<F>(overrides: F) -> Arc<MockLlm>
where
    F: Fn(Phase) -> Option<Result<String, String>> + Send + Sync + 'static,
{
    Arc::new(MockLlm::from_fn(move |messages| {
        let phase = phase_of(messages);
        match overrides(phase) {
            Some(Ok(text)) => Ok(LlmResponse::text(text)),
            Some(Err(e)) => Err(AgentError::ExecutionFailed(e)),
            None => Ok(LlmResponse::text(default_reply(phase))),
        }
    }))
}

/// LLM that approves everything.
pub fn approving_llm() -> Arc<MockLlm> {
    scripted_llm(|_| None)
}

/// Number of recorded calls in `phase`.
pub fn calls_in(llm: &MockLlm, phase: Phase) -> usize {
    llm.calls().iter().filter(|m| phase_of(m) == phase).count()
}

fn search_spec() -> ToolSpec {
    ToolSpec {
        name: "web_search".into(),
        description: Some("Search the web".into()),
        input_schema: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        }),
    }
}

/// `web_search` that returns a long result for every query.
pub fn search_tools() -> Arc<ToolRegistry> {
    let mut tools = ToolRegistry::new();
    tools.register_fn(search_spec(), |args: Value| {
        let query = args["query"].as_str().unwrap_or_default().to_string();
        Ok(Value::String(format!("Results for {}: {}", query, "detail ".repeat(40))))
    });
    Arc::new(tools)
}

/// `web_search` that always fails.
pub fn broken_search_tools() -> Arc<ToolRegistry> {
    let mut tools = ToolRegistry::new();
    tools.register_fn(search_spec(), |_| Err("search service unavailable".to_string()));
    Arc::new(tools)
}

/// `web_search` whose implementation panics on every call.
pub fn crashing_search_tools() -> Arc<ToolRegistry> {
    let mut tools = ToolRegistry::new();
    tools.register_fn(search_spec(), |_| panic!("subprocess wrapper crashed"));
    Arc::new(tools)
}
