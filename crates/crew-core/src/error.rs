//! Error types for Crew

use crate::sandbox::SandboxError;
use crate::tools::ToolError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for Crew operations
pub type CrewResult<T> = Result<T, CrewError>;

/// Main error type for Crew
#[derive(Error, Debug)]
pub enum CrewError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Lookup of an agent that is not registered
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Workspace sandbox errors
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Operation exceeded its deadline
    #[error("timed out after {limit:?}")]
    Timeout { limit: Duration },

    /// Operation was cancelled
    #[error("cancelled")]
    Cancelled,
}

impl CrewError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new timeout error
    pub const fn timeout(limit: Duration) -> Self {
        Self::Timeout { limit }
    }
}

impl From<ToolError> for CrewError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::Sandbox(err) => Self::Sandbox(err),
            ToolError::UnknownTool(name) => Self::Config(format!("unknown tool: {}", name)),
            ToolError::InvalidArguments(message) => Self::InvalidInput(message),
            ToolError::Json(err) => Self::Json(err),
        }
    }
}

impl From<reqwest::Error> for CrewError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_not_found_message() {
        let err = CrewError::AgentNotFound("reviewer".to_string());
        assert_eq!(err.to_string(), "agent not found: reviewer");
    }

    #[test]
    fn test_timeout_message() {
        let err = CrewError::timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "timed out after 250ms");
    }

    #[test]
    fn test_sandbox_error_is_transparent() {
        let err: CrewError = SandboxError::PathEscape {
            path: "../etc/passwd".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "path outside workspace: ../etc/passwd");
    }

    #[test]
    fn test_unknown_tool_becomes_config_error() {
        let err: CrewError = ToolError::UnknownTool("browser".to_string()).into();
        assert_eq!(err.to_string(), "Configuration error: unknown tool: browser");
    }

    #[test]
    fn test_tool_error_keeps_sandbox_variant() {
        let err: CrewError = ToolError::Sandbox(SandboxError::InvalidPattern(
            "unclosed group".to_string(),
        ))
        .into();
        assert!(matches!(err, CrewError::Sandbox(SandboxError::InvalidPattern(_))));
    }
}
