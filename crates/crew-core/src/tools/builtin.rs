//! Sandbox-backed tool implementations

use super::{Tool, ToolCall, ToolError, ToolKind, ToolSchema};
use crate::sandbox::Workspace;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

macro_rules! builtin_tool {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        pub struct $name {
            workspace: Arc<Workspace>,
        }

        impl $name {
            pub fn new(workspace: Arc<Workspace>) -> Self {
                Self { workspace }
            }

            const KIND: ToolKind = $kind;
        }
    };
}

builtin_tool!(
    /// Reads a file through the sandbox
    ReadTool,
    ToolKind::Read
);
builtin_tool!(
    /// Writes a file through the sandbox
    WriteTool,
    ToolKind::Write
);
builtin_tool!(GlobTool, ToolKind::Glob);
builtin_tool!(GrepTool, ToolKind::Grep);
builtin_tool!(
    /// Runs a command line with `sh -c` in the workspace root
    ShellTool,
    ToolKind::Shell
);
builtin_tool!(ListTool, ToolKind::List);

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        Self::KIND.as_str()
    }

    fn description(&self) -> &str {
        Self::KIND.description()
    }

    fn schema(&self) -> ToolSchema {
        Self::KIND.schema()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let path = call.require_string("path")?;
        let content = self.workspace.read(&path).await?;
        Ok(Value::String(content))
    }
}

#[async_trait]
impl Tool for WriteTool {
    fn name(&self) -> &str {
        Self::KIND.as_str()
    }

    fn description(&self) -> &str {
        Self::KIND.description()
    }

    fn schema(&self) -> ToolSchema {
        Self::KIND.schema()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let path = call.require_string("path")?;
        let content = call.require_string("content")?;
        self.workspace.write(&path, &content).await?;
        Ok(Value::String(format!(
            "Wrote {} bytes to {}",
            content.len(),
            path
        )))
    }
}

#[async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &str {
        Self::KIND.as_str()
    }

    fn description(&self) -> &str {
        Self::KIND.description()
    }

    fn schema(&self) -> ToolSchema {
        Self::KIND.schema()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let pattern = call.require_string("pattern")?;
        let matches = self.workspace.glob(&pattern).await?;
        Ok(serde_json::to_value(matches)?)
    }
}

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str {
        Self::KIND.as_str()
    }

    fn description(&self) -> &str {
        Self::KIND.description()
    }

    fn schema(&self) -> ToolSchema {
        Self::KIND.schema()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let pattern = call.require_string("pattern")?;
        let file_pattern = call.get_string("file_pattern");
        let matches = self.workspace.grep(&pattern, file_pattern.as_deref()).await?;
        Ok(serde_json::to_value(matches)?)
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        Self::KIND.as_str()
    }

    fn description(&self) -> &str {
        Self::KIND.description()
    }

    fn schema(&self) -> ToolSchema {
        Self::KIND.schema()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let command = call.require_string("command")?;
        let result = self.workspace.run_shell(&command).await?;
        Ok(serde_json::to_value(result)?)
    }
}

#[async_trait]
impl Tool for ListTool {
    fn name(&self) -> &str {
        Self::KIND.as_str()
    }

    fn description(&self) -> &str {
        Self::KIND.description()
    }

    fn schema(&self) -> ToolSchema {
        Self::KIND.schema()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let path = call.get_string("path").unwrap_or_else(|| ".".to_string());
        let entries = self.workspace.list_directory(&path).await?;
        Ok(serde_json::to_value(entries)?)
    }
}
