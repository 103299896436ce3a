//! In-process agent driving the completion/tool-call loop

use super::{AgentResult, AgentSpec};
use crate::error::CrewResult;
use crate::llm::{CompletionOptions, LlmClient, LlmMessage};
use crate::sandbox::Workspace;
use crate::tools::{Tool, ToolCall, ToolError, ToolSchema, create_tools};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Output reported when the iteration ceiling stops the loop
pub const MAX_ITERATIONS_OUTPUT: &str = "Max iterations reached";

/// Error reported when the iteration ceiling stops the loop
pub const MAX_ITERATIONS_ERROR: &str = "agent loop exceeded maximum iterations";

/// A configured agent bound to its tools and LLM client
pub struct EmbeddedAgent {
    spec: AgentSpec,
    tools: Vec<Arc<dyn Tool>>,
    schemas: Vec<ToolSchema>,
    llm: Arc<dyn LlmClient>,
}

impl std::fmt::Debug for EmbeddedAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedAgent")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Outcome of a single Thinking step
enum StepResult {
    /// Tool calls were executed; ask the model again
    Continue,
    /// The model produced its final answer
    Completed(String),
}

impl EmbeddedAgent {
    /// Bind `spec` to sandbox-backed tools and an LLM client.
    ///
    /// Fails if the spec names a tool that does not exist.
    pub fn new(
        spec: AgentSpec,
        workspace: Arc<Workspace>,
        llm: Arc<dyn LlmClient>,
    ) -> CrewResult<Self> {
        let tools = create_tools(&spec.tools, workspace)?;
        let schemas = tools.iter().map(|tool| tool.schema()).collect();
        Ok(Self {
            spec,
            tools,
            schemas,
            llm,
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    /// Run the agent loop to completion.
    ///
    /// Never fails: LLM errors, cancellation and the iteration ceiling all
    /// produce a failed [`AgentResult`].
    #[instrument(skip(self, input, cancel), fields(agent = %self.spec.name))]
    pub async fn invoke(&self, input: &str, cancel: &CancellationToken) -> AgentResult {
        let mut messages = vec![
            LlmMessage::system(&self.spec.instructions),
            LlmMessage::user(input),
        ];
        let options = CompletionOptions {
            model: self.spec.model.clone(),
            max_tokens: Some(self.spec.max_tokens),
            temperature: None,
        };

        for iteration in 0..self.spec.max_iterations {
            if cancel.is_cancelled() {
                return AgentResult::failure(&self.spec.name, input, "cancelled");
            }
            debug!(iteration, messages = messages.len(), "requesting completion");

            match self.step(&mut messages, &options, cancel).await {
                Ok(StepResult::Continue) => continue,
                Ok(StepResult::Completed(output)) => {
                    info!(iterations = iteration + 1, "agent completed");
                    return AgentResult::success(&self.spec.name, input, output);
                }
                Err(error) => {
                    warn!(%error, "agent step failed");
                    return AgentResult::failure(&self.spec.name, input, error);
                }
            }
        }

        warn!(max_iterations = self.spec.max_iterations, "iteration ceiling reached");
        AgentResult::failure(&self.spec.name, input, MAX_ITERATIONS_ERROR)
            .with_output(MAX_ITERATIONS_OUTPUT)
    }

    /// One Thinking step, plus the Executing step when tools are requested
    async fn step(
        &self,
        messages: &mut Vec<LlmMessage>,
        options: &CompletionOptions,
        cancel: &CancellationToken,
    ) -> Result<StepResult, String> {
        let completion = tokio::select! {
            _ = cancel.cancelled() => return Err("cancelled".to_string()),
            completion = self.llm.complete(messages.as_slice(), &self.schemas, options) => completion,
        };
        let response = completion.map_err(|e| format!("LLM completion failed: {}", e))?;

        if response.tool_calls.is_empty() || response.done {
            return Ok(StepResult::Completed(response.content));
        }

        messages.push(LlmMessage::assistant_with_tools(
            response.content,
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            let content = match self.execute_tool(call).await {
                Ok(value) => render_tool_output(value),
                Err(error) => format!("Error: {}", error),
            };
            messages.push(LlmMessage::tool(content, &call.id, &call.name));
        }

        Ok(StepResult::Continue)
    }

    async fn execute_tool(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

        debug!(tool = %call.name, id = %call.id, "executing tool");
        tool.execute(call).await
    }
}

/// Strings go to the model verbatim; everything else as JSON
fn render_tool_output(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, MessageRole};
    use crate::testing::{ScriptedLlm, StubLlm};
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Arc<Workspace>) {
        let dir = TempDir::new().unwrap();
        let ws = Arc::new(Workspace::new(dir.path()).unwrap());
        (dir, ws)
    }

    fn tool_call(id: &str, name: &str, args: Value) -> ToolCall {
        let arguments: HashMap<String, Value> = serde_json::from_value(args).unwrap();
        ToolCall::new(id, name, arguments)
    }

    #[tokio::test]
    async fn test_text_response_completes() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(StubLlm::replying("looks fine"));
        let agent = EmbeddedAgent::new(AgentSpec::new("reviewer", "review"), ws, llm).unwrap();

        let result = agent.invoke("check it", &CancellationToken::new()).await;
        assert!(result.success);
        assert_eq!(result.agent, "reviewer");
        assert_eq!(result.input, "check it");
        assert_eq!(result.output, "looks fine");
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_seeds_system_and_user_messages() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(ScriptedLlm::new(vec![CompletionResponse::text("ok")]));
        let spec = AgentSpec::new("a", "You are terse.").with_tools(["read"]);
        let agent = EmbeddedAgent::new(spec, ws, llm.clone()).unwrap();
        agent.invoke("hello", &CancellationToken::new()).await;

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        let (messages, tools) = &requests[0];
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, "You are terse.");
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[1].content, "hello");
        assert_eq!(tools, &vec!["read".to_string()]);
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back_in_order() {
        let (dir, ws) = workspace();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let llm = Arc::new(ScriptedLlm::new(vec![
            CompletionResponse::with_tool_calls(
                "let me look",
                vec![
                    tool_call("c1", "read", json!({"path": "a.txt"})),
                    tool_call("c2", "glob", json!({"pattern": "*.txt"})),
                ],
            ),
            CompletionResponse::text("a.txt says hello"),
        ]));
        let spec = AgentSpec::new("a", "x").with_tools(["read", "glob"]);
        let agent = EmbeddedAgent::new(spec, ws, llm.clone()).unwrap();

        let result = agent.invoke("what is in a.txt?", &CancellationToken::new()).await;
        assert!(result.success);
        assert_eq!(result.output, "a.txt says hello");

        let requests = llm.requests();
        let (messages, _) = &requests[1];
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[2].role, MessageRole::Assistant);
        assert_eq!(messages[2].tool_calls.len(), 2);
        assert_eq!(messages[3].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(messages[3].content, "hello");
        assert_eq!(messages[4].tool_call_id.as_deref(), Some("c2"));
        assert_eq!(messages[4].name.as_deref(), Some("glob"));
        assert_eq!(messages[4].content, r#"["a.txt"]"#);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_folded_into_message() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(ScriptedLlm::new(vec![
            CompletionResponse::with_tool_calls("", vec![tool_call("c1", "browser", json!({}))]),
            CompletionResponse::text("recovered"),
        ]));
        let agent = EmbeddedAgent::new(AgentSpec::new("a", "x"), ws, llm.clone()).unwrap();

        let result = agent.invoke("go", &CancellationToken::new()).await;
        assert!(result.success);
        assert_eq!(result.output, "recovered");
        let requests = llm.requests();
        assert_eq!(requests[1].0[3].content, "Error: unknown tool: browser");
    }

    #[tokio::test]
    async fn test_tool_error_is_folded_into_message() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(ScriptedLlm::new(vec![
            CompletionResponse::with_tool_calls(
                "",
                vec![tool_call("c1", "read", json!({"path": "../../etc/passwd"}))],
            ),
            CompletionResponse::text("denied"),
        ]));
        let spec = AgentSpec::new("a", "x").with_tools(["read"]);
        let agent = EmbeddedAgent::new(spec, ws, llm.clone()).unwrap();

        agent.invoke("go", &CancellationToken::new()).await;
        let requests = llm.requests();
        assert_eq!(
            requests[1].0[3].content,
            "Error: path outside workspace: ../../etc/passwd"
        );
    }

    #[tokio::test]
    async fn test_iteration_ceiling_fails() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(StubLlm::tool_loop());
        let spec = AgentSpec::new("looper", "x")
            .with_tools(["list"])
            .with_max_iterations(4);
        let agent = EmbeddedAgent::new(spec, ws, llm.clone()).unwrap();

        let result = agent.invoke("spin", &CancellationToken::new()).await;
        assert!(!result.success);
        assert_eq!(result.output, MAX_ITERATIONS_OUTPUT);
        assert_eq!(result.error.as_deref(), Some(MAX_ITERATIONS_ERROR));
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn test_default_ceiling_is_ten() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(StubLlm::tool_loop());
        let agent = EmbeddedAgent::new(AgentSpec::new("looper", "x"), ws, llm.clone()).unwrap();

        let result = agent.invoke("spin", &CancellationToken::new()).await;
        assert!(!result.success);
        assert_eq!(llm.calls(), 10);
    }

    #[tokio::test]
    async fn test_llm_failure_becomes_failed_result() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(StubLlm::failing("rate limited"));
        let agent = EmbeddedAgent::new(AgentSpec::new("a", "x"), ws, llm).unwrap();

        let result = agent.invoke("go", &CancellationToken::new()).await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("LLM completion failed: LLM error: rate limited")
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (_dir, ws) = workspace();
        let llm = Arc::new(StubLlm::replying("never"));
        let agent = EmbeddedAgent::new(AgentSpec::new("a", "x"), ws, llm.clone()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = agent.invoke("go", &cancel).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("cancelled"));
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn test_unknown_configured_tool_rejected() {
        let dir = TempDir::new().unwrap();
        let ws = Arc::new(Workspace::new(dir.path()).unwrap());
        let llm = Arc::new(StubLlm::replying("x"));
        let spec = AgentSpec::new("a", "x").with_tools(["teleport"]);
        let err = EmbeddedAgent::new(spec, ws, llm).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: unknown tool: teleport");
    }
}
