//! Configuration data structures

use crate::sandbox::DEFAULT_MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default LLM output budget per completion
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default agent loop iteration ceiling
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Default cap on a single protocol line (10 MiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// Root configuration for the runtime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for all sandboxed file and process access
    pub workspace: PathBuf,
    pub agents: Vec<AgentConfig>,
    pub mcp: McpConfig,
    pub llm: LlmConfig,
    pub timeouts: TimeoutConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Look up an agent definition by name
    pub fn get_agent_config(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    /// Names of all configured agents, in declaration order
    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.name.as_str()).collect()
    }
}

/// A single agent definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Unique identifier for the agent
    pub name: String,
    /// When to use this agent
    pub description: String,
    /// System prompt text, or a path to a `.md` file holding it
    pub instructions: String,
    /// Tool names: read, write, glob, grep, shell, list
    pub tools: Vec<String>,
    /// Overrides `llm.model` for this agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Overrides `limits.max_iterations` for this agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn effective_max_tokens(&self) -> u32 {
        match self.max_tokens {
            Some(tokens) if tokens > 0 => tokens,
            _ => DEFAULT_MAX_TOKENS,
        }
    }
}

/// MCP server identity and transport limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub server_name: String,
    pub server_version: String,
    /// Longest accepted protocol line in bytes
    pub max_message_bytes: usize,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_name: "crew".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

/// Supported LLM backends, all spoken to over the OpenAI chat API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Ollama,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Ollama => "http://localhost:11434/v1",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::OpenAi => write!(f, "openai"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// Language model settings shared by all agents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// May reference environment variables, e.g. `${OPENAI_API_KEY}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: "gpt-4o".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
        }
    }
}

impl LlmConfig {
    /// API key after environment expansion.
    ///
    /// OpenAI falls back to `OPENAI_API_KEY` when no key is configured or the
    /// configured reference cannot be expanded. Ollama needs no key.
    pub fn resolved_api_key(&self) -> Option<String> {
        let configured = self
            .api_key
            .as_deref()
            .and_then(|key| shellexpand::env(key).ok())
            .map(|key| key.into_owned())
            .filter(|key| !key.is_empty());

        match self.provider {
            LlmProvider::OpenAi => {
                configured.or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
            }
            LlmProvider::Ollama => configured,
        }
    }

    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }
}

/// Deadlines for long-running operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Single agent invocation
    #[serde(with = "humantime_serde")]
    pub agent_invoke: Duration,
    /// Sandboxed process execution
    #[serde(with = "humantime_serde")]
    pub shell_command: Duration,
    #[serde(with = "humantime_serde")]
    pub file_read: Duration,
    /// Whole parallel batch
    #[serde(with = "humantime_serde")]
    pub parallel_total: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            agent_invoke: Duration::from_secs(5 * 60),
            shell_command: Duration::from_secs(2 * 60),
            file_read: Duration::from_secs(30),
            parallel_total: Duration::from_secs(10 * 60),
        }
    }
}

/// Resource ceilings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest file `read` will return, in bytes
    pub max_file_size: u64,
    /// Agent loop iteration ceiling
    pub max_iterations: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
