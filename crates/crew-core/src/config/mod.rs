//! Configuration
//!
//! A single document (YAML, TOML, or JSON) describes the workspace, the
//! agents, and the runtime limits.

mod loader;
mod model;
mod validation;

pub use loader::{ConfigFormat, load_from_file, load_from_str};
pub use model::{
    AgentConfig, Config, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_MAX_TOKENS,
    LimitsConfig, LlmConfig, LlmProvider, LogFormat, LoggingConfig, McpConfig, TimeoutConfig,
};
