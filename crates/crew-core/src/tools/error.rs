//! Error types for tool operations

use crate::sandbox::SandboxError;

/// Error type for tool construction and execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Missing or mistyped arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool name with no registered implementation
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The underlying sandbox primitive failed
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
