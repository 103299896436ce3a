//! Sandbox error types

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sandbox operations
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Failures raised by workspace-confined filesystem and process primitives.
///
/// Every variant is recoverable at the call site: the MCP layer turns them
/// into `isError` content blocks and the agent loop into tool messages.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The path resolves outside the workspace root
    #[error("path outside workspace: {path}")]
    PathEscape { path: String },

    /// A file operation targeted a directory
    #[error("path is a directory: {0}")]
    IsDirectory(String),

    /// The file exceeds the configured read limit
    #[error("file too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    /// Regex or glob pattern failed to compile
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// The process could not be started
    #[error("command execution failed: {0}")]
    SpawnFailed(String),

    /// The operation ran past its deadline
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    /// Underlying filesystem failure
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SandboxError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
