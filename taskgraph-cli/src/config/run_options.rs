//! Optional overrides for a run (from CLI flags or set programmatically).
//!
//! Applied on top of the env-based config by
//! [`RunConfig::apply_options`](super::RunConfig::apply_options).

/// Optional overrides: only set fields replace the env-based values.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Override the model name.
    pub model: Option<String>,
    /// Override sampling temperature (0-2).
    pub temperature: Option<f32>,
    /// Override the checkpoint database path.
    pub db_path: Option<String>,
    /// Override the artifact output directory.
    pub output_dir: Option<String>,
    /// Override the revision cap.
    pub max_revisions: Option<u32>,
    /// Override the per-step timeout in seconds.
    pub step_timeout_secs: Option<u64>,
    /// Show debug logs.
    pub verbose: bool,
}
