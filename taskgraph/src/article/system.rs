//! Wiring of the article team into a compiled graph, and the run entry points.

use std::sync::Arc;

use tokio_stream::wrappers::ReceiverStream;

use crate::artifact::ArtifactStore;
use crate::error::RunError;
use crate::graph::{CompilationError, CompiledStateGraph, EngineConfig, RunOutcome, StateGraph};
use crate::llm::LlmClient;
use crate::memory::{Checkpointer, MemorySaver, RunnableConfig, TimeTravel};
use crate::message::Message;
use crate::stream::StreamEvent;
use crate::tool_source::ToolRegistry;

use super::{
    ArticleConfig, ArticlePatch, ArticleRecovery, ArticleState, ControllerNode, ResearcherNode,
    ReviewerNode, Role, Stage, WriterNode,
};

/// Fresh state for `task`: stage `init`, controller active, task echoed as a user message.
pub fn initial_state(task: impl Into<String>) -> ArticleState {
    let task = task.into();
    ArticleState {
        messages: vec![Message::user(task.clone())],
        task,
        current_step: Stage::Init,
        active_agent: Role::Controller,
        ..Default::default()
    }
}

/// Builds the uncompiled article graph.
///
/// Routes: controller may hand to any role or itself; researcher and writer report
/// back to the controller; the reviewer sends drafts back to the writer or completes.
pub fn build_article_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    config: ArticleConfig,
) -> StateGraph<ArticleState> {
    let controller = Role::Controller.as_str();
    let researcher = Role::Researcher.as_str();
    let writer = Role::Writer.as_str();
    let reviewer = Role::Reviewer.as_str();

    let mut graph = StateGraph::new();
    graph
        .add_node(
            controller,
            Arc::new(ControllerNode::new(llm.clone(), config.clone())),
        )
        .add_node(
            researcher,
            Arc::new(ResearcherNode::new(
                llm.clone(),
                tools,
                artifacts.clone(),
                config.clone(),
            )),
        )
        .add_node(writer, Arc::new(WriterNode::new(llm.clone(), artifacts.clone())))
        .add_node(
            reviewer,
            Arc::new(ReviewerNode::new(llm, artifacts.clone(), config.clone())),
        )
        .set_entry_point(controller)
        .add_conditional_edges(controller, Role::ALL.map(|r| r.as_str()))
        .add_edge(researcher, controller)
        .add_edge(writer, controller)
        .add_conditional_edges(reviewer, [writer, controller])
        .with_recovery(Arc::new(ArticleRecovery::new(
            artifacts,
            config.max_recoveries,
        )));
    graph
}

/// Builder for [`ArticleSystem`]. Only the LLM is required.
pub struct ArticleSystemBuilder {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    checkpointer: Option<Arc<dyn Checkpointer<ArticleState>>>,
    config: ArticleConfig,
    engine: EngineConfig,
}

impl ArticleSystemBuilder {
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    pub fn artifacts(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.artifacts = Some(store);
        self
    }

    /// Checkpoint log; defaults to an in-memory one.
    pub fn checkpointer(mut self, checkpointer: Arc<dyn Checkpointer<ArticleState>>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn config(mut self, config: ArticleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn build(self) -> Result<ArticleSystem, CompilationError> {
        let mut graph = build_article_graph(self.llm, self.tools, self.artifacts, self.config);
        graph.with_config(self.engine);
        let checkpointer = self
            .checkpointer
            .unwrap_or_else(|| Arc::new(MemorySaver::new()));
        Ok(ArticleSystem {
            graph: graph.compile_with_checkpointer(checkpointer)?,
        })
    }
}

/// The compiled article team.
///
/// **Interaction**: Built by the CLI and tests; runs share the builder's checkpointer,
/// so `time_travel` sees every run started here.
#[derive(Clone)]
pub struct ArticleSystem {
    graph: CompiledStateGraph<ArticleState>,
}

impl ArticleSystem {
    pub fn builder(llm: Arc<dyn LlmClient>) -> ArticleSystemBuilder {
        ArticleSystemBuilder {
            llm,
            tools: Arc::new(ToolRegistry::new()),
            artifacts: None,
            checkpointer: None,
            config: ArticleConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    pub fn graph(&self) -> &CompiledStateGraph<ArticleState> {
        &self.graph
    }

    /// Runs `task` to completion.
    pub async fn run(
        &self,
        task: impl Into<String>,
        config: RunnableConfig,
    ) -> Result<RunOutcome<ArticleState>, RunError> {
        self.graph.invoke(initial_state(task), config).await
    }

    /// Starts `task` on a background task and streams its events.
    pub fn start(
        &self,
        task: impl Into<String>,
        config: RunnableConfig,
    ) -> ReceiverStream<StreamEvent<ArticleState>> {
        self.graph.stream(initial_state(task), config)
    }

    /// Resumes from checkpoint `index` of `run_id` as a new streamed run.
    pub async fn resume(
        &self,
        run_id: &str,
        index: u64,
        state_override: Option<ArticlePatch>,
        config: RunnableConfig,
    ) -> Result<ReceiverStream<StreamEvent<ArticleState>>, RunError> {
        self.time_travel()
            .resume_stream(run_id, index, state_override, config)
            .await
    }

    pub fn time_travel(&self) -> TimeTravel<ArticleState> {
        self.graph.time_travel()
    }
}
