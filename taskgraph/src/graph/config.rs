//! Engine limits applied to every run of a compiled graph.

use std::time::Duration;

/// Default iteration cap per run.
pub const DEFAULT_MAX_STEPS: usize = 100;

/// Engine limits: per-step timeout and the iteration cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum wall time of one node call. A step that exceeds it is treated as a step
    /// failure and routed through recovery. `None` disables the timeout.
    pub step_timeout: Option<Duration>,
    /// Maximum number of iterations (node steps plus recoveries) per run.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_timeout: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl EngineConfig {
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}
