//! Crew MCP server
//!
//! Speaks the Model Context Protocol (JSON-RPC 2.0, one message per line)
//! so CLI assistants can list and invoke Crew agents and use the sandboxed
//! workspace tools directly.

pub mod catalog;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;
pub mod types;

pub use catalog::{ServerTool, catalog};
pub use error::{McpError, McpResult};
pub use protocol::{MCP_PROTOCOL_VERSION, McpRequest, McpResponse, McpRpcError, RequestId};
pub use server::McpServer;
pub use transport::{serve, serve_stdio};
pub use types::{McpContent, McpTool, McpToolResult};
