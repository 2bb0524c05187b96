//! Human-readable lines for stream events and checkpoint listings.

use taskgraph::article::ArticleState;
use taskgraph::{Checkpoint, CheckpointSource, GraphState, StreamEvent, RECOVERY};

/// One progress line per event; `None` for failures (surfaced as errors instead).
pub fn describe_event(event: &StreamEvent<ArticleState>) -> Option<String> {
    match event {
        StreamEvent::Started {
            run_id,
            parent: None,
        } => Some(format!("run {} started", run_id)),
        StreamEvent::Started {
            run_id,
            parent: Some((from, index)),
        } => Some(format!("run {} resumed from {}#{}", run_id, from, index)),
        StreamEvent::Step {
            index,
            node_id,
            state,
            ..
        } => {
            let who = if node_id == RECOVERY {
                "recovery"
            } else {
                node_id.as_str()
            };
            Some(match GraphState::error(state) {
                Some(e) => format!("[{}] {} failed: {}", index, who, e),
                None => format!(
                    "[{}] {} -> {} ({})",
                    index, who, state.current_step, state.active_agent
                ),
            })
        }
        StreamEvent::Completed {
            run_id,
            last_checkpoint,
            ..
        } => Some(format!(
            "run {} completed at checkpoint {}",
            run_id, last_checkpoint
        )),
        StreamEvent::Cancelled {
            run_id,
            last_checkpoint,
        } => Some(format!(
            "run {} cancelled at checkpoint {}",
            run_id, last_checkpoint
        )),
        StreamEvent::Failed(_) => None,
    }
}

/// One line per checkpoint: index, time, source, stage and a short status.
pub fn format_history(history: &[Checkpoint<ArticleState>]) -> String {
    history
        .iter()
        .map(|cp| {
            let source = match &cp.metadata.source {
                CheckpointSource::Input => "input".to_string(),
                CheckpointSource::Fork { run_id, index } => format!("fork {}#{}", run_id, index),
                CheckpointSource::Loop => cp.metadata.node.clone().unwrap_or_default(),
                CheckpointSource::Recovery => "recovery".to_string(),
            };
            let status = match GraphState::error(&cp.state) {
                Some(e) => format!("error: {}", e),
                None => cp.state.describe().unwrap_or_else(|| "-".to_string()),
            };
            format!(
                "{:>3}  {}  {:<16} {:<15} {}",
                cp.index,
                cp.created_at.format("%H:%M:%S"),
                source,
                cp.state.current_step.as_str(),
                status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
