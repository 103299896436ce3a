//! Read-only descriptors returned by sandbox primitives

use serde::{Deserialize, Serialize};

/// A single line matched by `grep`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepMatch {
    /// Workspace-relative file path
    pub file: String,
    /// 1-based line number
    pub line: usize,
    /// Matched line with surrounding whitespace trimmed
    pub content: String,
}

/// A directory entry returned by `list_directory`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    /// Workspace-relative path of the entry
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Captured output of a sandboxed process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// True when the process exited with status 0
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
