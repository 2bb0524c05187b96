//! Per-invocation config: run id and cancellation.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Config for a single `invoke` / `stream` / `resume` call.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke` and `TimeTravel::resume`.
/// Cancelling `cancel` stops the run between iterations; the last checkpoint stays
/// resumable.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Run id to record checkpoints under. A UUID v4 is generated when unset.
    pub run_id: Option<String>,
    /// Cooperative cancellation, checked before every iteration.
    pub cancel: CancellationToken,
}

impl RunnableConfig {
    /// Config with an explicit run id.
    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        Self {
            run_id: Some(run_id.into()),
            ..Default::default()
        }
    }

    /// Uses `token` for cancellation.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The configured run id, or a fresh UUID.
    pub fn resolve_run_id(&self) -> String {
        self.run_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}
