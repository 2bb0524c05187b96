//! Run config: LLM endpoint, storage locations and article limits. Filled from env / .env.
//!
//! Converted into library configs with [`RunConfig::article_config`],
//! [`RunConfig::engine_config`] and [`RunConfig::retry_config`].

use std::time::Duration;

use taskgraph::{ArticleConfig, EngineConfig, RetryConfig};

/// Error type used by the CLI.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_DB_PATH: &str = "taskgraph.db";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Run config for the CLI.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// OpenAI-compatible API base URL.
    pub api_base: String,
    /// API key; empty for commands that never call the model.
    pub api_key: String,
    pub model: String,
    /// Sampling temperature 0-2. Unset uses the API default.
    pub temperature: Option<f32>,
    /// SQLite checkpoint database.
    pub db_path: String,
    /// Directory artifacts are written to.
    pub output_dir: String,
    pub max_revisions: u32,
    /// Per-step timeout; unset disables it.
    pub step_timeout_secs: Option<u64>,
    /// Retries per LLM call after the first attempt.
    pub llm_max_retries: u32,
    /// Debug logging (set by `--verbose`).
    pub verbose: bool,
}

impl RunConfig {
    /// Fill config from env vars (call `dotenv::dotenv().ok()` first to include `.env`).
    ///
    /// `OPENAI_API_KEY` required; `OPENAI_API_BASE`, `OPENAI_MODEL` have defaults.
    /// `OPENAI_TEMPERATURE`, `DB_PATH`, `OUTPUT_DIR`, `MAX_REVISIONS`,
    /// `STEP_TIMEOUT_SECS`, `LLM_MAX_RETRIES` optional; unparsable values fall back to
    /// their defaults.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "OPENAI_API_KEY is not set; please configure it in .env",
                )
            })?;
        Ok(Self {
            api_key,
            ..Self::storage_from_env()
        })
    }

    /// Like [`from_env`](Self::from_env) but without the API key, for commands that only
    /// read checkpoints.
    pub fn storage_from_env() -> Self {
        let defaults = ArticleConfig::default();
        Self {
            api_base: std::env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_key: String::new(),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: parsed("OPENAI_TEMPERATURE"),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string()),
            max_revisions: parsed("MAX_REVISIONS").unwrap_or(defaults.max_revisions),
            step_timeout_secs: parsed("STEP_TIMEOUT_SECS").filter(|s| *s > 0),
            llm_max_retries: parsed("LLM_MAX_RETRIES")
                .unwrap_or(RetryConfig::default().max_retries),
            verbose: false,
        }
    }

    /// Apply optional overrides; only set fields in `options` replace values.
    pub fn apply_options(&mut self, options: &super::RunOptions) {
        if let Some(m) = &options.model {
            self.model = m.clone();
        }
        if let Some(t) = options.temperature {
            self.temperature = Some(t);
        }
        if let Some(p) = &options.db_path {
            self.db_path = p.clone();
        }
        if let Some(d) = &options.output_dir {
            self.output_dir = d.clone();
        }
        if let Some(n) = options.max_revisions {
            self.max_revisions = n;
        }
        if let Some(s) = options.step_timeout_secs {
            self.step_timeout_secs = Some(s).filter(|s| *s > 0);
        }
        self.verbose = options.verbose;
    }

    pub fn article_config(&self) -> ArticleConfig {
        ArticleConfig::default().with_max_revisions(self.max_revisions)
    }

    pub fn engine_config(&self) -> EngineConfig {
        match self.step_timeout_secs {
            Some(secs) => EngineConfig::default().with_step_timeout(Duration::from_secs(secs)),
            None => EngineConfig::default(),
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.llm_max_retries,
            ..RetryConfig::default()
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
