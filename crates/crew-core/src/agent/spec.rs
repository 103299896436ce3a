//! Immutable agent definitions built from configuration

use crate::config::{AgentConfig, DEFAULT_MAX_ITERATIONS};
use crate::error::{CrewError, CrewResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A fully resolved agent definition.
///
/// Instructions are already loaded from disk when configured as a `.md`
/// path; the effective token budget and iteration ceiling are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub tools: Vec<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub max_iterations: usize,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instructions: instructions.into(),
            tools: Vec::new(),
            model: None,
            max_tokens: crate::config::DEFAULT_MAX_TOKENS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
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

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Resolve an agent definition.
    ///
    /// `instructions` ending in `.md` are read from the path as given, then
    /// relative to `workspace_root`.
    pub fn from_config(
        config: &AgentConfig,
        workspace_root: &Path,
        default_max_iterations: usize,
    ) -> CrewResult<Self> {
        let instructions = if config.instructions.ends_with(".md") {
            load_instructions(&config.instructions, workspace_root)?
        } else {
            config.instructions.clone()
        };

        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            instructions,
            tools: config.tools.clone(),
            model: config.model.clone(),
            max_tokens: config.effective_max_tokens(),
            max_iterations: config.max_iterations.unwrap_or(default_max_iterations),
        })
    }

    pub fn info(&self) -> AgentInfo {
        AgentInfo {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

fn load_instructions(path: &str, workspace_root: &Path) -> CrewResult<String> {
    fs::read_to_string(path)
        .or_else(|_| fs::read_to_string(workspace_root.join(path)))
        .map_err(|e| CrewError::config(format!("failed to load instructions {}: {}", path, e)))
}

/// Name and description of a registered agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
}
