//! Terminal artifact of one agent run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent: String,
    pub input: String,
    pub output: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    pub fn success(
        agent: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            input: input.into(),
            output: output.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(
        agent: impl Into<String>,
        input: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            input: input.into(),
            output: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Error text, or an empty string for successful runs
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}
