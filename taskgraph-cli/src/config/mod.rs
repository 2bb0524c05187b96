//! Configuration for the CLI: env-based [`RunConfig`] plus [`RunOptions`] overrides.

mod run_config;
mod run_options;

pub use run_config::{
    Error, RunConfig, DEFAULT_API_BASE, DEFAULT_DB_PATH, DEFAULT_MODEL, DEFAULT_OUTPUT_DIR,
};
pub use run_options::RunOptions;
