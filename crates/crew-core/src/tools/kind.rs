//! Closed set of tool kinds and their static schema table

use super::{ToolError, ToolParameter, ToolSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tool names an agent may be configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Read,
    Write,
    Glob,
    Grep,
    Shell,
    List,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Read,
        ToolKind::Write,
        ToolKind::Glob,
        ToolKind::Grep,
        ToolKind::Shell,
        ToolKind::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Read => "read",
            ToolKind::Write => "write",
            ToolKind::Glob => "glob",
            ToolKind::Grep => "grep",
            ToolKind::Shell => "shell",
            ToolKind::List => "list",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::Read => "Read the contents of a file",
            ToolKind::Write => "Write content to a file",
            ToolKind::Glob => "Find files matching a glob pattern",
            ToolKind::Grep => "Search for a pattern in files",
            ToolKind::Shell => "Execute a shell command",
            ToolKind::List => "List the entries of a directory",
        }
    }

    /// LLM-facing parameter schema for this kind
    pub fn schema(&self) -> ToolSchema {
        let parameters = match self {
            ToolKind::Read => vec![ToolParameter::string(
                "path",
                "Path to the file, relative to the workspace",
            )],
            ToolKind::Write => vec![
                ToolParameter::string("path", "Path to the file, relative to the workspace"),
                ToolParameter::string("content", "Content to write"),
            ],
            ToolKind::Glob => vec![ToolParameter::string(
                "pattern",
                "Glob pattern (e.g., **/*.go)",
            )],
            ToolKind::Grep => vec![
                ToolParameter::string("pattern", "Regex pattern to search for"),
                ToolParameter::optional_string(
                    "file_pattern",
                    "Optional glob to filter file names",
                ),
            ],
            ToolKind::Shell => vec![ToolParameter::string("command", "Shell command to execute")],
            ToolKind::List => vec![ToolParameter::optional_string(
                "path",
                "Directory to list, relative to the workspace (default: root)",
            )],
        };
        ToolSchema::new(self.as_str(), self.description(), parameters)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.as_str().parse::<ToolKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "browser".parse::<ToolKind>().unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "browser"));
    }

    #[test]
    fn test_schema_table() {
        let write = ToolKind::Write.schema();
        assert_eq!(write.name, "write");
        assert_eq!(
            write.parameters["required"],
            serde_json::json!(["path", "content"])
        );

        let list = ToolKind::List.schema();
        assert_eq!(list.parameters["required"], serde_json::json!([]));
    }
}
