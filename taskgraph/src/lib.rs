//! # taskgraph
//!
//! Stateful multi-agent task orchestration. Agent steps are graph nodes over one typed
//! shared state; each step returns a patch that the engine merges, checkpoints and
//! routes on. Failures are recorded in state and handled by a recovery policy instead
//! of aborting the run. Every iteration is persisted, so any run can be inspected and
//! resumed from any checkpoint.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, the router and the
//!   `RecoveryPolicy` contract.
//! - [`memory`]: `Checkpointer` (`MemorySaver`, `SqliteSaver`) and `TimeTravel`.
//! - [`tool_source`]: `ToolRegistry`, schema validation, batched invocation.
//! - [`llm`]: `LlmClient`, `MockLlm`, `RetryingLlm`, optional `ChatOpenAI`.
//! - [`article`]: controller, researcher, writer and reviewer roles for writing an
//!   article, wired by `ArticleSystem`.
//! - [`assistant`]: a tool-calling assistant loop.
//! - [`artifact`]: where steps persist documents.
//!
//! ## Features
//!
//! - `sqlite` (default): `SqliteSaver` persistent checkpointer.
//! - `openai`: `ChatOpenAI` client for OpenAI-compatible endpoints via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskgraph::{ArticleSystem, MockLlm, RunnableConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let system = ArticleSystem::builder(Arc::new(MockLlm::with_reply("VERDICT: APPROVE")))
//!     .build()
//!     .unwrap();
//! let outcome = system.run("AI trends", RunnableConfig::default()).await.unwrap();
//! println!("{}", outcome.state.final_output);
//! # }
//! ```

pub mod article;
pub mod artifact;
pub mod assistant;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod state;
pub mod stream;
pub mod tool_source;

pub use article::{ArticleConfig, ArticlePatch, ArticleState, ArticleSystem, Role, Stage};
pub use artifact::{ArtifactError, ArtifactStore, FileArtifactStore, InMemoryArtifactStore};
pub use assistant::{build_assistant_graph, AssistantPatch, AssistantState};
pub use error::{AgentError, RunError};
pub use graph::{
    route, CompilationError, CompiledStateGraph, EngineConfig, Node, RecoveryPolicy, Route,
    RunOutcome, RunStatus, StateGraph, END, RECOVERY, START,
};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use llm::{LlmClient, LlmResponse, MockLlm, MockReply, RetryConfig, RetryingLlm};
pub use memory::{
    Checkpoint, CheckpointError, CheckpointMetadata, CheckpointSource, Checkpointer,
    ExecutionTrace, JsonSerializer, MemorySaver, RunnableConfig, TimeTravel,
};
#[cfg(feature = "sqlite")]
pub use memory::SqliteSaver;
pub use message::Message;
pub use state::{GraphState, ToolCall, ToolResult};
pub use stream::StreamEvent;
pub use tool_source::{Tool, ToolError, ToolRegistry, ToolSpec};
