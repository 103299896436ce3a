//! Agent loop
//!
//! An [`EmbeddedAgent`] alternates LLM completions and tool executions until
//! the model answers without tool calls or the iteration ceiling is hit.

mod embedded;
mod result;
mod spec;

pub use embedded::{EmbeddedAgent, MAX_ITERATIONS_ERROR, MAX_ITERATIONS_OUTPUT};
pub use result::AgentResult;
pub use spec::{AgentInfo, AgentSpec};
