//! Shared test state and helpers.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskgraph::{AgentError, GraphState, Node, RecoveryPolicy, StateGraph, END};

/// Minimal routed state: nodes append to `visited` and name the next node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub visited: Vec<String>,
    pub next: String,
    pub done: bool,
    pub error: Option<String>,
    pub recoveries: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FlowPatch {
    pub visited: Vec<String>,
    pub next: Option<String>,
    pub done: Option<bool>,
    pub error: Option<Option<String>>,
    pub recoveries: Option<u32>,
}

impl GraphState for Flow {
    type Patch = FlowPatch;

    fn apply(&mut self, patch: FlowPatch) {
        self.visited.extend(patch.visited);
        if let Some(next) = patch.next {
            self.next = next;
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
        if let Some(error) = patch.error {
            self.error = error;
        }
        if let Some(n) = patch.recoveries {
            self.recoveries = n;
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn is_complete(&self) -> bool {
        self.done
    }

    fn active_agent(&self) -> &str {
        &self.next
    }

    fn current_step(&self) -> &str {
        if self.done {
            "done"
        } else {
            "running"
        }
    }

    fn failure(message: String) -> FlowPatch {
        FlowPatch {
            error: Some(Some(message)),
            ..Default::default()
        }
    }
}

/// Patch: record `from`, hand over to `to`.
pub fn goto(from: &str, to: &str) -> FlowPatch {
    FlowPatch {
        visited: vec![from.to_string()],
        next: Some(to.to_string()),
        ..Default::default()
    }
}

/// Patch: record `from`, mark complete.
pub fn finish(from: &str) -> FlowPatch {
    FlowPatch {
        visited: vec![from.to_string()],
        done: Some(true),
        ..Default::default()
    }
}

/// Patch: record `from`, fail with `message`.
pub fn fail(from: &str, message: &str) -> FlowPatch {
    FlowPatch {
        visited: vec![from.to_string()],
        error: Some(Some(message.to_string())),
        ..Default::default()
    }
}

pub struct FnNode<F> {
    id: String,
    f: F,
}

#[async_trait]
impl<F> Node<Flow> for FnNode<F>
where
    F: Fn(&Flow) -> Result<FlowPatch, AgentError> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: &Flow) -> Result<FlowPatch, AgentError> {
        (self.f)(state)
    }
}

/// Node from a closure.
pub fn node<F>(id: &str, f: F) -> Arc<dyn Node<Flow>>
where
    F: Fn(&Flow) -> Result<FlowPatch, AgentError> + Send + Sync + 'static,
{
    Arc::new(FnNode {
        id: id.to_string(),
        f,
    })
}

/// Node that sleeps before handing over; used for timeouts.
pub struct SlowNode {
    pub id: String,
    pub delay: std::time::Duration,
    pub to: String,
}

#[async_trait]
impl Node<Flow> for SlowNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, _state: &Flow) -> Result<FlowPatch, AgentError> {
        tokio::time::sleep(self.delay).await;
        Ok(goto(&self.id, &self.to))
    }
}

/// Clears the error, counts the recovery and hands over to a fixed node.
pub struct ResumeAt(pub &'static str);

#[async_trait]
impl RecoveryPolicy<Flow> for ResumeAt {
    async fn recover(&self, state: &Flow) -> FlowPatch {
        FlowPatch {
            visited: vec!["recovery".to_string()],
            next: Some(self.0.to_string()),
            error: Some(None),
            recoveries: Some(state.recoveries + 1),
            ..Default::default()
        }
    }
}

/// Broken policy: never clears the error.
pub struct LeaveError;

#[async_trait]
impl RecoveryPolicy<Flow> for LeaveError {
    async fn recover(&self, _state: &Flow) -> FlowPatch {
        FlowPatch::default()
    }
}

/// a -> b -> c -> end, recovering to `c`.
pub fn pipeline() -> StateGraph<Flow> {
    let mut graph = StateGraph::new();
    graph
        .add_node("a", node("a", |_| Ok(goto("a", "b"))))
        .add_node("b", node("b", |_| Ok(goto("b", "c"))))
        .add_node("c", node("c", |_| Ok(finish("c"))))
        .set_entry_point("a")
        .add_edge("a", "b")
        .add_edge("b", "c")
        .add_edge("c", END)
        .with_recovery(Arc::new(ResumeAt("c")));
    graph
}

pub fn input() -> Flow {
    Flow::default()
}
