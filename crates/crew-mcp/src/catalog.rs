//! Fixed catalog of tools exposed over MCP

use crate::types::McpTool;
use crew_core::tools::{ToolParameter, ToolSchema};
use std::fmt;

/// Every tool callable through `tools/call`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerTool {
    InvokeAgent,
    InvokeParallel,
    ListAgents,
    ReadFile,
    GlobFiles,
    GrepFiles,
    RunCommand,
}

impl ServerTool {
    /// Catalog order: orchestration tools, then direct workspace tools
    pub const ALL: [ServerTool; 7] = [
        ServerTool::InvokeAgent,
        ServerTool::InvokeParallel,
        ServerTool::ListAgents,
        ServerTool::ReadFile,
        ServerTool::GlobFiles,
        ServerTool::GrepFiles,
        ServerTool::RunCommand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerTool::InvokeAgent => "invoke_agent",
            ServerTool::InvokeParallel => "invoke_parallel",
            ServerTool::ListAgents => "list_agents",
            ServerTool::ReadFile => "read_file",
            ServerTool::GlobFiles => "glob_files",
            ServerTool::GrepFiles => "grep_files",
            ServerTool::RunCommand => "run_command",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ServerTool::InvokeAgent => "Invoke a specific agent with an input prompt",
            ServerTool::InvokeParallel => "Invoke multiple agents in parallel with the same input",
            ServerTool::ListAgents => "List all available agents and their descriptions",
            ServerTool::ReadFile => "Read the contents of a file in the workspace",
            ServerTool::GlobFiles => "Find files matching a glob pattern",
            ServerTool::GrepFiles => "Search for a pattern in files",
            ServerTool::RunCommand => "Execute a shell command in the workspace",
        }
    }

    /// Input schema; `invoke_agent` enumerates the configured agent names
    pub fn schema(&self, agent_names: &[String]) -> ToolSchema {
        let parameters = match self {
            ServerTool::InvokeAgent => {
                let mut agent = ToolParameter::string("agent", "Name of the agent to invoke");
                // An empty enum would admit no value at all
                if !agent_names.is_empty() {
                    agent = agent.with_enum(agent_names.iter().cloned());
                }
                vec![agent, ToolParameter::string("input", "Input prompt for the agent")]
            }
            ServerTool::InvokeParallel => vec![
                ToolParameter::string("agents", "Comma-separated list of agent names"),
                ToolParameter::string("input", "Input prompt for all agents"),
            ],
            ServerTool::ListAgents => Vec::new(),
            ServerTool::ReadFile => vec![ToolParameter::string(
                "path",
                "Path to the file (relative to workspace)",
            )],
            ServerTool::GlobFiles => vec![ToolParameter::string(
                "pattern",
                "Glob pattern (e.g., '**/*.rs')",
            )],
            ServerTool::GrepFiles => vec![
                ToolParameter::string("pattern", "Regex pattern to search for"),
                ToolParameter::optional_string("file_pattern", "Optional file name pattern filter"),
            ],
            ServerTool::RunCommand => {
                vec![ToolParameter::string("command", "Shell command to execute")]
            }
        };
        ToolSchema::new(self.as_str(), self.description(), parameters)
    }
}

impl fmt::Display for ServerTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full `tools/list` catalog
pub fn catalog(agent_names: &[String]) -> Vec<McpTool> {
    ServerTool::ALL
        .iter()
        .map(|tool| McpTool::from(tool.schema(agent_names)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_order() {
        let names: Vec<String> = catalog(&[]).into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "invoke_agent",
                "invoke_parallel",
                "list_agents",
                "read_file",
                "glob_files",
                "grep_files",
                "run_command"
            ]
        );
    }

    #[test]
    fn test_invoke_agent_enumerates_agents() {
        let agents = vec!["reviewer".to_string(), "tester".to_string()];
        let tool = McpTool::from(ServerTool::InvokeAgent.schema(&agents));
        assert_eq!(
            tool.input_schema["properties"]["agent"]["enum"],
            json!(["reviewer", "tester"])
        );
        assert_eq!(tool.input_schema["required"], json!(["agent", "input"]));
    }

    #[test]
    fn test_invoke_agent_without_agents_has_no_enum() {
        let tool = McpTool::from(ServerTool::InvokeAgent.schema(&[]));
        let agent = &tool.input_schema["properties"]["agent"];
        assert_eq!(agent["type"], "string");
        assert!(agent.get("enum").is_none());
        assert_eq!(tool.input_schema["required"], json!(["agent", "input"]));
    }

    #[test]
    fn test_grep_file_pattern_is_optional() {
        let tool = McpTool::from(ServerTool::GrepFiles.schema(&[]));
        assert_eq!(tool.input_schema["required"], json!(["pattern"]));
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ServerTool::from_name("run_command"), Some(ServerTool::RunCommand));
        assert_eq!(ServerTool::from_name("write_file"), None);
    }
}
