//! taskgraph-cli library: run, resume and inspect article runs from the command line.
//!
//! Reads config from env / .env, builds the article system with a SQLite checkpoint log
//! and file artifacts, and prints progress while a run streams.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! dotenv::dotenv().ok();
//! let config = taskgraph_cli::RunConfig::from_env()?;
//! let llm = taskgraph_cli::build_llm(&config)?;
//! let outcome = taskgraph_cli::run_task(&config, llm, "AI trends", Default::default()).await?;
//! println!("{}", outcome.state.final_output);
//! ```

mod config;
mod run;

pub use config::{
    Error, RunConfig, RunOptions, DEFAULT_API_BASE, DEFAULT_DB_PATH, DEFAULT_MODEL,
    DEFAULT_OUTPUT_DIR,
};
pub use run::{
    build_llm, build_system, describe_event, format_history, history, inspect, list_runs,
    open_checkpointer, parse_patch, resume_run, run_task, trace,
};
pub use taskgraph::article::{ArticlePatch, ArticleState};

#[cfg(test)]
mod tests;
