//! Name-to-tool construction

use super::{
    GlobTool, GrepTool, ListTool, ReadTool, ShellTool, Tool, ToolError, ToolKind, ToolSchema,
    WriteTool,
};
use crate::sandbox::Workspace;
use std::sync::Arc;

/// Build tool instances for the given names, in order.
///
/// Fails on the first name that is not a known tool kind.
pub fn create_tools<S: AsRef<str>>(
    names: &[S],
    workspace: Arc<Workspace>,
) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
    names
        .iter()
        .map(|name| -> Result<Arc<dyn Tool>, ToolError> {
            let kind: ToolKind = name.as_ref().parse()?;
            Ok(create_tool(kind, Arc::clone(&workspace)))
        })
        .collect()
}

/// Build the tool implementing `kind`
pub fn create_tool(kind: ToolKind, workspace: Arc<Workspace>) -> Arc<dyn Tool> {
    match kind {
        ToolKind::Read => Arc::new(ReadTool::new(workspace)),
        ToolKind::Write => Arc::new(WriteTool::new(workspace)),
        ToolKind::Glob => Arc::new(GlobTool::new(workspace)),
        ToolKind::Grep => Arc::new(GrepTool::new(workspace)),
        ToolKind::Shell => Arc::new(ShellTool::new(workspace)),
        ToolKind::List => Arc::new(ListTool::new(workspace)),
    }
}

/// Schemas for the given tool names, skipping unknown ones
pub fn tool_schemas<S: AsRef<str>>(names: &[S]) -> Vec<ToolSchema> {
    names
        .iter()
        .filter_map(|name| name.as_ref().parse::<ToolKind>().ok())
        .map(|kind| kind.schema())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::SandboxError;
    use crate::tools::ToolCall;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Arc<Workspace>) {
        let dir = TempDir::new().unwrap();
        let ws = Arc::new(Workspace::new(dir.path()).unwrap());
        (dir, ws)
    }

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        let arguments: HashMap<String, serde_json::Value> =
            serde_json::from_value(args).unwrap();
        ToolCall::new("call_1", name, arguments)
    }

    #[test]
    fn test_create_tools_preserves_order() {
        let (_dir, ws) = workspace();
        let tools = create_tools(&["grep", "read", "shell"], ws).unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["grep", "read", "shell"]);
    }

    #[test]
    fn test_create_tools_unknown_name() {
        let (_dir, ws) = workspace();
        let err = create_tools(&["read", "browser"], ws).err().unwrap();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "browser"));
    }

    #[test]
    fn test_tool_schemas_skip_unknown() {
        let schemas = tool_schemas(&["read", "nope", "glob"]);
        let names: Vec<_> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["read", "glob"]);
    }

    #[tokio::test]
    async fn test_write_then_read_through_tools() {
        let (_dir, ws) = workspace();
        let tools = create_tools(&["write", "read"], ws).unwrap();

        let written = tools[0]
            .execute(&call("write", json!({"path": "out/a.txt", "content": "hello"})))
            .await
            .unwrap();
        assert_eq!(written, json!("Wrote 5 bytes to out/a.txt"));

        let read = tools[1]
            .execute(&call("read", json!({"path": "out/a.txt"})))
            .await
            .unwrap();
        assert_eq!(read, json!("hello"));
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let (_dir, ws) = workspace();
        let tool = create_tool(ToolKind::Read, ws);
        let err = tool.execute(&call("read", json!({}))).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_sandbox_errors_surface() {
        let (_dir, ws) = workspace();
        let tool = create_tool(ToolKind::Read, ws);
        let err = tool
            .execute(&call("read", json!({"path": "../../etc/passwd"})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Sandbox(SandboxError::PathEscape { .. })
        ));
    }

    #[tokio::test]
    async fn test_grep_and_glob_return_json_arrays() {
        let (dir, ws) = workspace();
        std::fs::write(dir.path().join("a.rs"), "let x = 1;\nlet y = 2;\n").unwrap();
        let grep = create_tool(ToolKind::Grep, Arc::clone(&ws));
        let found = grep
            .execute(&call("grep", json!({"pattern": "y =", "file_pattern": "*.rs"})))
            .await
            .unwrap();
        assert_eq!(
            found,
            json!([{"file": "a.rs", "line": 2, "content": "let y = 2;"}])
        );

        let glob = create_tool(ToolKind::Glob, ws);
        let files = glob
            .execute(&call("glob", json!({"pattern": "*.rs"})))
            .await
            .unwrap();
        assert_eq!(files, json!(["a.rs"]));
    }

    #[tokio::test]
    async fn test_list_defaults_to_root() {
        let (dir, ws) = workspace();
        std::fs::write(dir.path().join("a.txt"), "abc").unwrap();
        let tool = create_tool(ToolKind::List, ws);
        let listing = tool.execute(&call("list", json!({}))).await.unwrap();
        assert_eq!(
            listing,
            json!([{"name": "a.txt", "path": "a.txt", "is_dir": false, "size": 3}])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_returns_command_result() {
        let (_dir, ws) = workspace();
        let tool = create_tool(ToolKind::Shell, ws);
        let result = tool
            .execute(&call("shell", json!({"command": "echo hi"})))
            .await
            .unwrap();
        assert_eq!(result["stdout"], "hi\n");
        assert_eq!(result["exit_code"], 0);
    }
}
