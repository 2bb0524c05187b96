//! Tool invocation adapter.
//!
//! Tools register a [`ToolSpec`] (name, description, JSON-schema for arguments) and an
//! implementation of [`Tool`]. [`ToolRegistry`] validates arguments against the schema,
//! applies a per-call timeout and turns every failure into a [`ToolError`] value.

mod registry;
mod schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub(crate) use registry::truncate_for_log;
pub use registry::{ToolRegistry, DEFAULT_EXECUTION_ERROR_TEMPLATE};
pub use schema::validate_arguments;

/// Tool description handed to LLMs and used for argument validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    /// JSON-schema object: `properties.<field>.type` and `required` are enforced.
    pub input_schema: Value,
}

/// Failure of a tool invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// No tool is registered under this name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments do not satisfy the tool's schema; the tool was not called.
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The tool ran and failed, panicked, or exceeded its timeout.
    #[error("tool '{tool}' failed: {message}")]
    ToolExecutionError { tool: String, message: String },
}

/// An external capability callable by name.
///
/// `call` returns the tool's error text as `Err`; the registry wraps it in
/// [`ToolError::ToolExecutionError`].
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn call(&self, arguments: Value) -> Result<Value, String>;
}

/// Wraps a synchronous function as a [`Tool`].
pub struct FnTool<F> {
    spec: ToolSpec,
    f: F,
}

impl<F> FnTool<F>
where
    F: Fn(Value) -> Result<Value, String> + Send + Sync,
{
    pub fn new(spec: ToolSpec, f: F) -> Self {
        Self { spec, f }
    }
}

#[async_trait]
impl<F> Tool for FnTool<F>
where
    F: Fn(Value) -> Result<Value, String> + Send + Sync,
{
    fn spec(&self) -> ToolSpec {
        self.spec.clone()
    }

    async fn call(&self, arguments: Value) -> Result<Value, String> {
        (self.f)(arguments)
    }
}
