//! Configuration validation

use super::Config;
use crate::error::{CrewError, CrewResult};
use crate::tools::ToolKind;
use std::collections::HashSet;
use std::path::PathBuf;

impl Config {
    /// Check the configuration and resolve the workspace to a canonical
    /// absolute directory.
    pub fn validate(&mut self) -> CrewResult<()> {
        if self.workspace.as_os_str().is_empty() {
            self.workspace = PathBuf::from(".");
        }
        let workspace = self.workspace.canonicalize().map_err(|e| {
            CrewError::config(format!(
                "workspace does not exist: {}: {}",
                self.workspace.display(),
                e
            ))
        })?;
        if !workspace.is_dir() {
            return Err(CrewError::config(format!(
                "workspace is not a directory: {}",
                workspace.display()
            )));
        }
        self.workspace = workspace;

        let mut names = HashSet::new();
        for (index, agent) in self.agents.iter().enumerate() {
            if agent.name.trim().is_empty() {
                return Err(CrewError::config(format!("agent {}: name is required", index)));
            }
            if !names.insert(agent.name.as_str()) {
                return Err(CrewError::config(format!(
                    "duplicate agent name: {}",
                    agent.name
                )));
            }
            if agent.instructions.trim().is_empty() {
                return Err(CrewError::config(format!(
                    "agent {}: instructions required",
                    agent.name
                )));
            }
            for tool in &agent.tools {
                if tool.parse::<ToolKind>().is_err() {
                    return Err(CrewError::config(format!(
                        "agent {}: unknown tool {:?}",
                        agent.name, tool
                    )));
                }
            }
            if agent.max_iterations == Some(0) {
                return Err(CrewError::config(format!(
                    "agent {}: max_iterations must be at least 1",
                    agent.name
                )));
            }
        }

        if self.limits.max_iterations == 0 {
            return Err(CrewError::config("limits.max_iterations must be at least 1"));
        }
        if self.mcp.max_message_bytes == 0 {
            return Err(CrewError::config("mcp.max_message_bytes must be positive"));
        }

        Ok(())
    }
}
