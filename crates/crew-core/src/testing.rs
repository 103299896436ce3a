//! Stub LLM clients for tests
//!
//! Enabled for this crate's unit tests and for downstream crates through the
//! `test-util` feature.

use crate::error::{CrewError, CrewResult};
use crate::llm::{CompletionOptions, CompletionResponse, LlmClient, LlmMessage, MessageRole};
use crate::tools::{ToolCall, ToolSchema};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How a [`StubLlm`] answers a completion request
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Final text answer
    Reply(String),
    /// Completion error
    Fail(String),
    /// Always request a `list` tool call, never finishing
    ToolLoop,
}

/// Rule-based stub keyed by the agent's instructions (the system message).
///
/// Safe to share between concurrently running agents.
pub struct StubLlm {
    default: StubBehavior,
    rules: HashMap<String, (StubBehavior, Option<Duration>)>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn new(default: StubBehavior) -> Self {
        Self {
            default,
            rules: HashMap::new(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(StubBehavior::Reply(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(StubBehavior::Fail(message.into()))
    }

    pub fn tool_loop() -> Self {
        Self::new(StubBehavior::ToolLoop)
    }

    /// Answer agents whose instructions equal `instructions` with `behavior`
    pub fn with_agent(mut self, instructions: impl Into<String>, behavior: StubBehavior) -> Self {
        self.rules.insert(instructions.into(), (behavior, None));
        self
    }

    /// Like [`StubLlm::with_agent`], sleeping `delay` before answering
    pub fn with_delayed_agent(
        mut self,
        instructions: impl Into<String>,
        behavior: StubBehavior,
        delay: Duration,
    ) -> Self {
        self.rules.insert(instructions.into(), (behavior, Some(delay)));
        self
    }

    /// Number of completion requests received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User message of every request, in arrival order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(
        &self,
        messages: &[LlmMessage],
        _tools: &[ToolSchema],
        _options: &CompletionOptions,
    ) -> CrewResult<CompletionResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        let instructions = first_content(messages, MessageRole::System);
        if let Some(prompt) = messages.iter().find(|m| m.role == MessageRole::User) {
            self.prompts.lock().push(prompt.content.clone());
        }

        let (behavior, delay) = self
            .rules
            .get(instructions)
            .cloned()
            .unwrap_or_else(|| (self.default.clone(), None));

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match behavior {
            StubBehavior::Reply(text) => Ok(CompletionResponse::text(text)),
            StubBehavior::Fail(message) => Err(CrewError::llm(message)),
            StubBehavior::ToolLoop => Ok(CompletionResponse::with_tool_calls(
                "",
                vec![ToolCall::new(format!("call_{}", call), "list", HashMap::new())],
            )),
        }
    }
}

fn first_content(messages: &[LlmMessage], role: MessageRole) -> &str {
    messages
        .iter()
        .find(|m| m.role == role)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// Replays a fixed sequence of responses and records every request
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<(Vec<LlmMessage>, Vec<String>)>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Message history and tool names of every request received
    pub fn requests(&self) -> Vec<(Vec<LlmMessage>, Vec<String>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolSchema],
        _options: &CompletionOptions,
    ) -> CrewResult<CompletionResponse> {
        self.requests.lock().push((
            messages.to_vec(),
            tools.iter().map(|t| t.name.clone()).collect(),
        ));
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| CrewError::llm("script exhausted"))
    }
}
