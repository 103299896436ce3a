//! Batch task and result types

use crate::agent::AgentResult;
use crate::error::CrewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preview length of each agent output in [`OrchestratedResult::summary`]
pub const SUMMARY_PREVIEW_CHARS: usize = 200;

/// One agent invocation within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTask {
    pub agent: String,
    pub input: String,
}

impl AgentTask {
    pub fn new(agent: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            input: input.into(),
        }
    }
}

/// How a batch of agents is executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// All agents at once with the same input
    #[default]
    Parallel,
    /// One after another, each seeing earlier outputs
    Sequential,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Parallel => write!(f, "parallel"),
            ExecutionMode::Sequential => write!(f, "sequential"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = CrewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parallel" => Ok(ExecutionMode::Parallel),
            "sequential" => Ok(ExecutionMode::Sequential),
            other => Err(CrewError::invalid_input(format!("unknown mode: {}", other))),
        }
    }
}

/// A named batch of agents sharing one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratedTask {
    pub name: String,
    /// Execution order for sequential mode
    pub agents: Vec<String>,
    pub input: String,
    pub mode: ExecutionMode,
}

impl OrchestratedTask {
    pub(crate) fn agent_tasks(&self) -> Vec<AgentTask> {
        self.agents
            .iter()
            .map(|agent| AgentTask::new(agent, &self.input))
            .collect()
    }
}

/// Results of an orchestrated batch, ordered like the task's agent list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratedResult {
    pub task: String,
    pub mode: ExecutionMode,
    pub results: Vec<AgentResult>,
}

impl OrchestratedResult {
    pub fn all_successful(&self) -> bool {
        self.results.iter().all(|result| result.success)
    }

    /// One line per agent: `[agent] STATUS: preview`
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        for result in &self.results {
            let status = if result.success { "SUCCESS" } else { "FAILED" };
            let text = if !result.success && result.output.is_empty() {
                result.error_text()
            } else {
                result.output.as_str()
            };
            summary.push_str(&format!(
                "[{}] {}: {}\n",
                result.agent,
                status,
                truncate(text, SUMMARY_PREVIEW_CHARS)
            ));
        }
        summary
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("parallel".parse::<ExecutionMode>().unwrap(), ExecutionMode::Parallel);
        assert_eq!(
            "sequential".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::Sequential
        );
        let err = "round-robin".parse::<ExecutionMode>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: unknown mode: round-robin");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("héllo wörld", 4), "héll...");
        assert_eq!(truncate("exact", 5), "exact");
    }

    #[test]
    fn test_summary_and_all_successful() {
        let result = OrchestratedResult {
            task: "review".to_string(),
            mode: ExecutionMode::Parallel,
            results: vec![
                AgentResult::success("a", "in", "x".repeat(250)),
                AgentResult::failure("b", "in", "agent not found: b"),
            ],
        };
        assert!(!result.all_successful());

        let summary = result.summary();
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("[a] SUCCESS: {}...", "x".repeat(200)));
        assert_eq!(lines[1], "[b] FAILED: agent not found: b");
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&ExecutionMode::Sequential).unwrap();
        assert_eq!(json, "\"sequential\"");
    }
}
