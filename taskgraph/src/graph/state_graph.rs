//! State graph builder: nodes, declared routes, entry point, recovery policy.
//!
//! Add nodes with `add_node`, declare every step each node may hand control to with
//! `add_conditional_edges` (or `add_edge` for a single target), pick the entry with
//! `set_entry_point`, attach a `RecoveryPolicy`, then `compile` or
//! `compile_with_checkpointer`. The static table is validated once at compile time;
//! at run time the state's active agent picks among the declared targets.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::config::EngineConfig;
use crate::graph::node::Node;
use crate::graph::recovery::{RecoveryPolicy, RECOVERY};
use crate::memory::{Checkpointer, MemorySaver};
use crate::state::GraphState;

/// Reserved id for graph entry in diagnostics.
pub const START: &str = "__start__";

/// Route target meaning "the run may finish here". Completion is signalled by state,
/// so declaring END is optional; it is accepted for readability.
pub const END: &str = "__end__";

/// State graph under construction.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>` and `Arc<dyn RecoveryPolicy<S>>`;
/// produces `CompiledStateGraph<S>`.
pub struct StateGraph<S: GraphState> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    duplicates: Vec<String>,
    routes: HashMap<String, HashSet<String>>,
    entry: Option<String>,
    recovery: Option<Arc<dyn RecoveryPolicy<S>>>,
    config: EngineConfig,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    /// Creates an empty graph with default engine limits.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            duplicates: Vec::new(),
            routes: HashMap::new(),
            entry: None,
            recovery: None,
            config: EngineConfig::default(),
        }
    }

    /// Registers a node. Ids must be unique; a duplicate is reported by `compile`.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            self.duplicates.push(id);
        } else {
            self.nodes.insert(id, node);
        }
        self
    }

    /// Declares the steps `from` may route to. Can be called repeatedly; targets accumulate.
    pub fn add_conditional_edges<I, T>(&mut self, from: impl Into<String>, targets: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.routes
            .entry(from.into())
            .or_default()
            .extend(targets.into_iter().map(Into::into));
        self
    }

    /// Declares a single route `from -> to`.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.add_conditional_edges(from, [to.into()])
    }

    /// Node that runs first on a fresh run.
    pub fn set_entry_point(&mut self, id: impl Into<String>) -> &mut Self {
        self.entry = Some(id.into());
        self
    }

    /// Policy applied whenever the state carries an error.
    pub fn with_recovery(&mut self, policy: Arc<dyn RecoveryPolicy<S>>) -> &mut Self {
        self.recovery = Some(policy);
        self
    }

    /// Engine limits (step timeout, iteration cap).
    pub fn with_config(&mut self, config: EngineConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Validates the step table and builds the executable graph with an in-memory
    /// checkpointer.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_with_checkpointer(Arc::new(MemorySaver::new()))
    }

    /// Validates the step table and builds the executable graph that records every
    /// iteration in `checkpointer`.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        if let Some(dup) = self.duplicates.into_iter().next() {
            return Err(CompilationError::DuplicateNode(dup));
        }
        if let Some(reserved) = self
            .nodes
            .keys()
            .find(|id| [START, END, RECOVERY].contains(&id.as_str()))
        {
            return Err(CompilationError::ReservedId(reserved.clone()));
        }

        let entry = self.entry.ok_or(CompilationError::MissingEntry)?;
        if !self.nodes.contains_key(&entry) {
            return Err(CompilationError::NodeNotFound(entry));
        }

        for (from, targets) in &self.routes {
            if !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if let Some(unknown) = targets
                .iter()
                .find(|t| t.as_str() != END && !self.nodes.contains_key(*t))
            {
                return Err(CompilationError::NodeNotFound(unknown.clone()));
            }
        }
        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();
        if let Some(silent) = ids.into_iter().find(|id| !self.routes.contains_key(*id)) {
            return Err(CompilationError::NoRoutes(silent.clone()));
        }

        let recovery = self
            .recovery
            .ok_or(CompilationError::MissingRecoveryPolicy)?;

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            routes: self.routes,
            entry,
            recovery,
            checkpointer,
            config: self.config,
        })
    }
}
