//! Command implementations: run a task, resume a checkpoint, and read recorded runs.
//!
//! Model-calling commands take the LLM as an argument so callers (and tests) choose the
//! client; [`build_llm`] builds the configured one.

mod llm;
mod report;

use std::sync::Arc;

use taskgraph::article::{ArticlePatch, ArticleState};
use taskgraph::{
    ArticleSystem, Checkpoint, Checkpointer, ExecutionTrace, FileArtifactStore, LlmClient,
    RunOutcome, RunStatus, RunnableConfig, StreamEvent, ToolRegistry,
};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::config::{Error, RunConfig};

pub use llm::build_llm;
pub use report::{describe_event, format_history};

/// Opens the checkpoint log at `config.db_path`.
#[cfg(feature = "sqlite")]
pub fn open_checkpointer(
    config: &RunConfig,
) -> Result<Arc<dyn Checkpointer<ArticleState>>, Error> {
    use taskgraph::{JsonSerializer, SqliteSaver};
    let saver = SqliteSaver::<ArticleState>::open(&config.db_path, Arc::new(JsonSerializer))?;
    Ok(Arc::new(saver))
}

/// Without SQLite, checkpoints live only as long as the process.
#[cfg(not(feature = "sqlite"))]
pub fn open_checkpointer(
    _config: &RunConfig,
) -> Result<Arc<dyn Checkpointer<ArticleState>>, Error> {
    tracing::warn!("built without the `sqlite` feature; checkpoints are not persisted");
    Ok(Arc::new(taskgraph::MemorySaver::<ArticleState>::new()))
}

/// Article system wired from `config`: file artifacts, persistent checkpoints, limits.
///
/// No concrete tools are registered; the researcher's searches fail and the recovery
/// policy continues with a placeholder summary.
pub fn build_system(config: &RunConfig, llm: Arc<dyn LlmClient>) -> Result<ArticleSystem, Error> {
    let system = ArticleSystem::builder(llm)
        .tools(Arc::new(ToolRegistry::new()))
        .artifacts(Arc::new(FileArtifactStore::new(&config.output_dir)))
        .checkpointer(open_checkpointer(config)?)
        .config(config.article_config())
        .engine_config(config.engine_config())
        .build()?;
    Ok(system)
}

/// Runs `task` and prints one progress line per event.
pub async fn run_task(
    config: &RunConfig,
    llm: Arc<dyn LlmClient>,
    task: &str,
    runnable: RunnableConfig,
) -> Result<RunOutcome<ArticleState>, Error> {
    let system = build_system(config, llm)?;
    drain(system.start(task, runnable)).await
}

/// Resumes `run_id` from checkpoint `index` as a new run, optionally merging `patch`.
pub async fn resume_run(
    config: &RunConfig,
    llm: Arc<dyn LlmClient>,
    run_id: &str,
    index: u64,
    patch: Option<ArticlePatch>,
    runnable: RunnableConfig,
) -> Result<RunOutcome<ArticleState>, Error> {
    let system = build_system(config, llm)?;
    let stream = system.resume(run_id, index, patch, runnable).await?;
    drain(stream).await
}

/// Parses an override patch given as JSON, e.g. `{"feedback": "shorter"}`.
pub fn parse_patch(json: &str) -> Result<ArticlePatch, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Recorded run ids.
pub async fn list_runs(config: &RunConfig) -> Result<Vec<String>, Error> {
    Ok(open_checkpointer(config)?.list_runs().await?)
}

/// All checkpoints of `run_id`; an unknown run is an error.
pub async fn history(
    config: &RunConfig,
    run_id: &str,
) -> Result<Vec<Checkpoint<ArticleState>>, Error> {
    let history = open_checkpointer(config)?.history(run_id).await?;
    if history.is_empty() {
        return Err(format!("no checkpoints for run '{}'", run_id).into());
    }
    Ok(history)
}

/// One checkpoint as pretty JSON.
pub async fn inspect(config: &RunConfig, run_id: &str, index: u64) -> Result<String, Error> {
    let checkpoint = open_checkpointer(config)?.get(run_id, index).await?;
    Ok(serde_json::to_string_pretty(&checkpoint)?)
}

/// Execution trace of `run_id`.
pub async fn trace(config: &RunConfig, run_id: &str) -> Result<ExecutionTrace, Error> {
    let history = history(config, run_id).await?;
    Ok(ExecutionTrace::from_history(run_id, &history))
}

async fn drain(
    mut stream: ReceiverStream<StreamEvent<ArticleState>>,
) -> Result<RunOutcome<ArticleState>, Error> {
    let mut steps = 0;
    while let Some(event) = stream.next().await {
        if let Some(line) = describe_event(&event) {
            println!("{}", line);
        }
        match event {
            StreamEvent::Step { .. } => steps += 1,
            StreamEvent::Completed {
                run_id,
                last_checkpoint,
                state,
            } => {
                return Ok(RunOutcome {
                    run_id,
                    status: RunStatus::Completed,
                    state,
                    last_checkpoint,
                    steps,
                })
            }
            StreamEvent::Cancelled {
                run_id,
                last_checkpoint,
            } => {
                return Err(format!(
                    "run {} cancelled; resume with `taskgraph resume {} {}`",
                    run_id, run_id, last_checkpoint
                )
                .into())
            }
            StreamEvent::Failed(e) => return Err(e.into()),
            StreamEvent::Started { .. } => {}
        }
    }
    Err("run ended without a terminal event".into())
}
