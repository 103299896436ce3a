//! Tool registry
//!
//! Maps declarative tool names to sandbox-backed [`Tool`] objects and
//! provides the static schema table the agent loop sends to the LLM.

mod base;
mod builtin;
mod error;
mod kind;
mod registry;
mod types;

pub use base::Tool;
pub use builtin::{GlobTool, GrepTool, ListTool, ReadTool, ShellTool, WriteTool};
pub use error::ToolError;
pub use kind::ToolKind;
pub use registry::{create_tool, create_tools, tool_schemas};
pub use types::{ToolCall, ToolParameter, ToolSchema};
