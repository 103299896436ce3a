//! Crew Core Library
//!
//! This crate provides the embedded agent runtime behind the Crew MCP server:
//! a path-confined workspace sandbox, the built-in tools exposed to agents,
//! the LLM tool-calling loop, and the orchestrator that runs agents alone,
//! in parallel or in sequence.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod runner;
pub mod sandbox;
pub mod tools;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export commonly used types
pub use agent::{AgentInfo, AgentResult, AgentSpec, EmbeddedAgent};
pub use config::{AgentConfig, Config};
pub use error::{CrewError, CrewResult};
pub use llm::{LlmClient, OpenAiClient};
pub use runner::{AgentTask, ExecutionMode, OrchestratedResult, OrchestratedTask, Runner};
pub use sandbox::{SandboxError, Workspace};
pub use tools::{Tool, ToolCall, ToolError, ToolKind, ToolSchema};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
