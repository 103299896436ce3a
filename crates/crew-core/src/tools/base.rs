//! Core Tool trait definition

use super::{ToolCall, ToolError, ToolSchema};
use async_trait::async_trait;

/// A sandbox-backed capability that an agent can invoke.
///
/// Results are plain JSON so the agent loop can hand them back to the model
/// without knowing which tool produced them.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's unique name (e.g., "read")
    fn name(&self) -> &str;

    /// Get the tool's description for LLM understanding
    fn description(&self) -> &str;

    /// Get the tool's JSON schema for input parameters
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the given arguments
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if arguments are missing or the sandbox operation
    /// fails.
    async fn execute(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError>;
}
