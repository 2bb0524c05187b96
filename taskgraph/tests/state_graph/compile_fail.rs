//! StateGraph compile failure cases.

use std::sync::Arc;

use taskgraph::{CompilationError, StateGraph, END, RECOVERY};

use crate::common::{goto, node, pipeline, Flow, ResumeAt};

#[test]
fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = pipeline();
    graph.add_edge("c", "missing");
    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("expected NodeNotFound, got {:?}", other.err()),
    }
}

#[test]
fn compile_fails_on_duplicate_node() {
    let mut graph = pipeline();
    graph.add_node("b", node("b", |_| Ok(goto("b", "c"))));
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::DuplicateNode("b".into()))
    );
}

#[test]
fn compile_fails_on_reserved_id() {
    let mut graph = pipeline();
    graph
        .add_node(RECOVERY, node(RECOVERY, |_| Ok(goto("x", "a"))))
        .add_edge(RECOVERY, "a");
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::ReservedId(RECOVERY.into()))
    );
}

#[test]
fn compile_fails_without_entry() {
    let mut graph = StateGraph::<Flow>::new();
    graph
        .add_node("a", node("a", |_| Ok(goto("a", "a"))))
        .add_edge("a", END)
        .with_recovery(Arc::new(ResumeAt("a")));
    assert_eq!(graph.compile().err(), Some(CompilationError::MissingEntry));
}

/// **Scenario**: Every node must declare where it may route to.
#[test]
fn compile_fails_when_node_has_no_routes() {
    let mut graph = pipeline();
    graph.add_node("orphan", node("orphan", |_| Ok(goto("orphan", "a"))));
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::NoRoutes("orphan".into()))
    );
}

#[test]
fn compile_fails_without_recovery_policy() {
    let mut graph = StateGraph::<Flow>::new();
    graph
        .add_node("a", node("a", |_| Ok(goto("a", "a"))))
        .set_entry_point("a")
        .add_edge("a", END);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::MissingRecoveryPolicy)
    );
}
