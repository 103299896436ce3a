//! MCP error types

use thiserror::Error;

/// Failures that end an MCP session.
///
/// Everything a single request can get wrong is answered with a JSON-RPC
/// error object instead; only the byte stream itself can fail here.
#[derive(Debug, Error)]
pub enum McpError {
    /// Reading from or writing to the transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// A response could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for MCP sessions
pub type McpResult<T> = Result<T, McpError>;
