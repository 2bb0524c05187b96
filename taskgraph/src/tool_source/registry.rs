//! Name-keyed tool registry with validation, timeouts and bounded fan-out.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::graph::panic_message;
use crate::state::{ToolCall, ToolResult};

use super::schema::validate_arguments;
use super::{FnTool, Tool, ToolError, ToolSpec};

/// Default execution error message template with tool name and arguments.
pub const DEFAULT_EXECUTION_ERROR_TEMPLATE: &str =
    "Error executing tool '{tool_name}' with arguments {tool_args}:\n {error}\n Please fix the error and try again.";

/// Truncates a string for logging, appending "..." if longer than max_len.
pub(crate) fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Registry of callable tools.
///
/// **Interaction**: Shared (`Arc<ToolRegistry>`) by agent steps; the researcher fans out
/// searches with [`invoke_batch`](Self::invoke_batch), the tool executor runs model
/// tool calls with [`invoke_call`](Self::invoke_call).
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    timeout: Option<Duration>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-call timeout; a call that exceeds it fails with `ToolExecutionError`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Registers a tool under its spec name. A later registration with the same name
    /// replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.spec().name;
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "tool re-registered; previous implementation replaced");
        }
        self
    }

    /// Registers a synchronous function as a tool.
    pub fn register_fn<F>(&mut self, spec: ToolSpec, f: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnTool::new(spec, f)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Specs of all registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Invokes `name` with `arguments`. Every failure is returned as a value.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        validate_arguments(&tool.spec().input_schema, &arguments).map_err(|reason| {
            ToolError::InvalidArguments {
                tool: name.to_string(),
                reason,
            }
        })?;

        debug!(tool = name, args = %truncate_for_log(&arguments.to_string(), 200), "calling tool");
        let call = AssertUnwindSafe(tool.call(arguments))
            .catch_unwind()
            .map(|outcome| {
                outcome.unwrap_or_else(|payload| {
                    Err(format!("tool panicked: {}", panic_message(payload.as_ref())))
                })
            });
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(r) => r,
                Err(_) => Err(format!("timed out after {:?}", limit)),
            },
            None => call.await,
        };

        match result {
            Ok(value) => {
                debug!(tool = name, result = %truncate_for_log(&value.to_string(), 200), "tool returned");
                Ok(value)
            }
            Err(message) => {
                warn!(tool = name, error = %message, "tool failed");
                Err(ToolError::ToolExecutionError {
                    tool: name.to_string(),
                    message,
                })
            }
        }
    }

    /// Invokes `name` once per argument set with at most `max_concurrency` calls in
    /// flight. Results are in the order of `arguments`, not completion order.
    pub async fn invoke_batch(
        &self,
        name: &str,
        arguments: Vec<Value>,
        max_concurrency: usize,
    ) -> Vec<Result<Value, ToolError>> {
        stream::iter(arguments.into_iter().map(|args| self.invoke(name, args)))
            .buffered(max_concurrency.max(1))
            .collect()
            .await
    }

    /// Runs a model-issued tool call. Argument text that is not JSON is
    /// `InvalidArguments`; empty text means no arguments.
    pub async fn invoke_call(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let arguments = if call.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.arguments).map_err(|e| ToolError::InvalidArguments {
                tool: call.name.clone(),
                reason: format!("arguments are not valid JSON: {}", e),
            })?
        };
        self.invoke(&call.name, arguments).await
    }

    /// Runs a tool call and renders the outcome as a [`ToolResult`]; failures are
    /// formatted with [`DEFAULT_EXECUTION_ERROR_TEMPLATE`].
    pub async fn execute_call(&self, call: &ToolCall) -> ToolResult {
        match self.invoke_call(call).await {
            Ok(value) => ToolResult {
                call_id: call.id.clone(),
                name: call.name.clone(),
                content: match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
                is_error: false,
            },
            Err(error) => ToolResult {
                call_id: call.id.clone(),
                name: call.name.clone(),
                content: DEFAULT_EXECUTION_ERROR_TEMPLATE
                    .replace("{tool_name}", &call.name)
                    .replace("{tool_args}", &call.arguments)
                    .replace("{error}", &error.to_string()),
                is_error: true,
            },
        }
    }
}
