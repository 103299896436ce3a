//! MCP request dispatcher
//!
//! Maps JSON-RPC methods onto the [`Runner`] and its workspace. Every request
//! is answered (or, for notifications, dropped) without ever failing the
//! session.

use crate::catalog::{ServerTool, catalog};
use crate::protocol::{MCP_PROTOCOL_VERSION, McpRequest, McpResponse, McpRpcError, RequestId, methods};
use crate::types::{
    CallToolParams, InitializeResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    McpCapabilities, McpServerInfo, McpToolResult, PromptCapabilities, ResourceCapabilities,
    ToolCapabilities,
};
use crew_core::runner::{AgentTask, Runner};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// MCP server exposing agents and workspace tools
pub struct McpServer {
    runner: Arc<Runner>,
    server_info: McpServerInfo,
    initialized: AtomicBool,
}

impl McpServer {
    pub fn new(runner: Arc<Runner>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            runner,
            server_info: McpServerInfo {
                name: name.into(),
                version: version.into(),
            },
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn runner(&self) -> &Arc<Runner> {
        &self.runner
    }

    /// Handle one line of input.
    ///
    /// Returns `None` for notifications; every other line gets a response,
    /// including lines that are not valid JSON.
    pub async fn handle_line(&self, line: &str, cancel: &CancellationToken) -> Option<McpResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                return Some(McpResponse::error(
                    None,
                    McpRpcError::parse_error().with_data(e.to_string()),
                ));
            }
        };

        match McpRequest::from_value(value) {
            Ok(request) => self.handle_request(request, cancel).await,
            Err((id, error)) => {
                warn!(?id, data = ?error.data, "invalid request");
                Some(McpResponse::error(id, error))
            }
        }
    }

    /// Dispatch a decoded request
    pub async fn handle_request(
        &self,
        request: McpRequest,
        cancel: &CancellationToken,
    ) -> Option<McpResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };
        debug!(method = %request.method, %id, "request");

        if request.method != methods::INITIALIZE
            && request.method != methods::PING
            && !self.is_initialized()
        {
            warn!(method = %request.method, "request received before initialize");
        }

        let id = Some(id);
        let response = match request.method.as_str() {
            methods::INITIALIZE => respond(id, &self.initialize()),
            methods::PING => McpResponse::success(id, Value::Object(Map::new())),
            methods::TOOLS_LIST => respond(
                id,
                &ListToolsResult {
                    tools: catalog(&self.runner.list_agents()),
                },
            ),
            methods::TOOLS_CALL => self.tools_call(id, request.params, cancel).await,
            methods::RESOURCES_LIST => respond(id, &ListResourcesResult::default()),
            methods::PROMPTS_LIST => respond(id, &ListPromptsResult::default()),
            methods::RESOURCES_READ => McpResponse::error(
                id,
                McpRpcError::new(McpRpcError::METHOD_NOT_FOUND, "Resources not supported"),
            ),
            methods::PROMPTS_GET => McpResponse::error(
                id,
                McpRpcError::new(McpRpcError::METHOD_NOT_FOUND, "Prompts not supported"),
            ),
            other => {
                debug!(method = other, "unknown method");
                McpResponse::error(id, McpRpcError::method_not_found().with_data(other))
            }
        };
        Some(response)
    }

    fn handle_notification(&self, method: &str) {
        match method {
            methods::INITIALIZED | methods::NOTIFICATIONS_INITIALIZED => {
                debug!("client confirmed initialization");
            }
            other => debug!(method = other, "ignoring notification"),
        }
    }

    fn initialize(&self) -> InitializeResult {
        if !self.initialized.swap(true, Ordering::SeqCst) {
            info!(server = %self.server_info.name, "session initialized");
        }
        InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: McpCapabilities {
                tools: Some(ToolCapabilities::default()),
                resources: Some(ResourceCapabilities::default()),
                prompts: Some(PromptCapabilities::default()),
            },
            server_info: self.server_info.clone(),
        }
    }

    async fn tools_call(
        &self,
        id: Option<RequestId>,
        params: Option<Value>,
        cancel: &CancellationToken,
    ) -> McpResponse {
        let params: CallToolParams =
            match serde_json::from_value(params.unwrap_or(Value::Null)) {
                Ok(params) => params,
                Err(e) => {
                    return McpResponse::error(
                        id,
                        McpRpcError::invalid_params().with_data(e.to_string()),
                    );
                }
            };

        let Some(tool) = ServerTool::from_name(&params.name) else {
            warn!(tool = %params.name, "unknown tool");
            return McpResponse::error(
                id,
                McpRpcError::new(McpRpcError::METHOD_NOT_FOUND, "Unknown tool")
                    .with_data(params.name),
            );
        };

        info!(%tool, "tool call");
        let result = self.call_tool(tool, &params.arguments, cancel).await;
        if result.is_error {
            debug!(%tool, "tool call reported an error");
        }
        respond(id, &result)
    }

    /// Run one catalog tool; failures become `isError` results
    pub async fn call_tool(
        &self,
        tool: ServerTool,
        args: &Map<String, Value>,
        cancel: &CancellationToken,
    ) -> McpToolResult {
        match tool {
            ServerTool::InvokeAgent => self.invoke_agent(args, cancel).await,
            ServerTool::InvokeParallel => self.invoke_parallel(args, cancel).await,
            ServerTool::ListAgents => self.list_agents(),
            ServerTool::ReadFile => self.read_file(args).await,
            ServerTool::GlobFiles => self.glob_files(args).await,
            ServerTool::GrepFiles => self.grep_files(args).await,
            ServerTool::RunCommand => self.run_command(args).await,
        }
    }

    async fn invoke_agent(&self, args: &Map<String, Value>, cancel: &CancellationToken) -> McpToolResult {
        let agent = string_arg(args, "agent");
        let input = string_arg(args, "input");
        if agent.is_empty() || input.is_empty() {
            return McpToolResult::error("agent and input are required");
        }

        match self.runner.invoke(agent, input, cancel).await {
            Ok(result) if result.success => McpToolResult::text(result.output),
            Ok(result) if result.output.is_empty() => McpToolResult::error(result.error_text()),
            Ok(result) => McpToolResult::text(result.output).with_error_flag(true),
            Err(e) => McpToolResult::error(e),
        }
    }

    async fn invoke_parallel(
        &self,
        args: &Map<String, Value>,
        cancel: &CancellationToken,
    ) -> McpToolResult {
        let agents = string_arg(args, "agents");
        let input = string_arg(args, "input");
        let tasks: Vec<AgentTask> = agents
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| AgentTask::new(name, input))
            .collect();
        if tasks.is_empty() || input.is_empty() {
            return McpToolResult::error("agents and input are required");
        }

        let results = self.runner.invoke_parallel(tasks, cancel).await;

        let mut output = String::new();
        for result in &results {
            let status = if result.success { "SUCCESS" } else { "FAILED" };
            let body = if !result.success && result.output.is_empty() {
                format!("Error: {}", result.error_text())
            } else {
                result.output.clone()
            };
            output.push_str(&format!("## {} [{}]\n\n{}\n\n", result.agent, status, body));
        }

        let has_error = results.iter().any(|result| !result.success);
        McpToolResult::text(output).with_error_flag(has_error)
    }

    fn list_agents(&self) -> McpToolResult {
        let mut output = String::from("# Available Agents\n\n");
        for info in self.runner.list_agent_info() {
            output.push_str(&format!("## {}\n{}\n\n", info.name, info.description));
        }
        McpToolResult::text(output)
    }

    async fn read_file(&self, args: &Map<String, Value>) -> McpToolResult {
        let path = string_arg(args, "path");
        if path.is_empty() {
            return McpToolResult::error("path is required");
        }

        match self.runner.workspace().read(path).await {
            Ok(content) => McpToolResult::text(content),
            Err(e) => McpToolResult::error(e),
        }
    }

    async fn glob_files(&self, args: &Map<String, Value>) -> McpToolResult {
        let pattern = string_arg(args, "pattern");
        if pattern.is_empty() {
            return McpToolResult::error("pattern is required");
        }

        match self.runner.workspace().glob(pattern).await {
            Ok(files) if files.is_empty() => McpToolResult::text("No files found"),
            Ok(files) => McpToolResult::text(files.join("\n")),
            Err(e) => McpToolResult::error(e),
        }
    }

    async fn grep_files(&self, args: &Map<String, Value>) -> McpToolResult {
        let pattern = string_arg(args, "pattern");
        if pattern.is_empty() {
            return McpToolResult::error("pattern is required");
        }
        let file_pattern = Some(string_arg(args, "file_pattern")).filter(|p| !p.is_empty());

        match self.runner.workspace().grep(pattern, file_pattern).await {
            Ok(matches) if matches.is_empty() => McpToolResult::text("No matches found"),
            Ok(matches) => {
                let mut output = String::new();
                for m in matches {
                    output.push_str(&format!("{}:{}: {}\n", m.file, m.line, m.content));
                }
                McpToolResult::text(output)
            }
            Err(e) => McpToolResult::error(e),
        }
    }

    async fn run_command(&self, args: &Map<String, Value>) -> McpToolResult {
        let command = string_arg(args, "command");
        if command.is_empty() {
            return McpToolResult::error("command is required");
        }

        let result = match self.runner.workspace().run_shell(command).await {
            Ok(result) => result,
            Err(e) => return McpToolResult::error(e),
        };

        let mut output = result.stdout.clone();
        if !result.stderr.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str("STDERR:\n");
            output.push_str(&result.stderr);
        }
        if !result.success() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&format!("Exit code: {}", result.exit_code));
        }

        McpToolResult::text(output).with_error_flag(!result.success())
    }
}

/// String argument, or `""` when absent or not a string
fn string_arg<'a>(args: &'a Map<String, Value>, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or("")
}

fn respond<T: Serialize>(id: Option<RequestId>, result: &T) -> McpResponse {
    match serde_json::to_value(result) {
        Ok(value) => McpResponse::success(id, value),
        Err(e) => McpResponse::error(id, McpRpcError::internal_error().with_data(e.to_string())),
    }
}
