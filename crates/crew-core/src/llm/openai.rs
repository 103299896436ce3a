//! OpenAI-compatible chat completions client

use super::{CompletionOptions, CompletionResponse, LlmClient, LlmMessage};
use crate::config::LlmConfig;
use crate::error::{CrewError, CrewResult};
use crate::tools::{ToolCall, ToolSchema};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for any endpoint speaking the OpenAI `/chat/completions` API
pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> CrewResult<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            temperature,
        })
    }

    /// Build a client from the `llm` configuration section
    pub fn from_config(config: &LlmConfig) -> CrewResult<Self> {
        Self::new(
            config.resolved_base_url(),
            config.resolved_api_key(),
            config.model.clone(),
            config.temperature,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[instrument(skip(self, messages, tools), fields(messages = messages.len()), level = "debug")]
    async fn complete(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolSchema],
        options: &CompletionOptions,
    ) -> CrewResult<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = build_request_body(messages, tools, options, &self.model, self.temperature);

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CrewError::llm(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CrewError::llm(format!(
                "API error (status {}): {}",
                status, error_text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| CrewError::llm(format!("failed to parse response: {}", e)))?;

        let parsed = parse_response(&response_json)?;
        debug!(tool_calls = parsed.tool_calls.len(), done = parsed.done, "completion received");
        Ok(parsed)
    }
}

/// Assemble the JSON request body for `/chat/completions`
pub fn build_request_body(
    messages: &[LlmMessage],
    tools: &[ToolSchema],
    options: &CompletionOptions,
    default_model: &str,
    default_temperature: f32,
) -> Value {
    let converted: Vec<Value> = messages.iter().map(convert_message).collect();

    let mut body = json!({
        "model": options.model.as_deref().unwrap_or(default_model),
        "messages": converted,
        "temperature": options.temperature.unwrap_or(default_temperature),
    });

    if let Some(max_tokens) = options.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    if !tools.is_empty() {
        let tool_defs: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters
                    }
                })
            })
            .collect();
        body["tools"] = json!(tool_defs);
    }

    body
}

fn convert_message(message: &LlmMessage) -> Value {
    let mut msg = json!({
        "role": message.role.to_string(),
        "content": message.content
    });

    if message.has_tool_calls() {
        let tool_calls: Vec<Value> = message
            .tool_calls
            .iter()
            .map(|tc| {
                json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": serde_json::to_string(&tc.arguments).unwrap_or_default()
                    }
                })
            })
            .collect();
        msg["tool_calls"] = json!(tool_calls);
    }

    if let Some(tool_call_id) = &message.tool_call_id {
        msg["tool_call_id"] = json!(tool_call_id);
    }

    if let Some(name) = &message.name {
        msg["name"] = json!(name);
    }

    msg
}

/// Parse a `/chat/completions` response body.
///
/// Tool calls without an id get a generated one so results can still be
/// correlated; undecodable argument strings become an empty object.
pub fn parse_response(response: &Value) -> CrewResult<CompletionResponse> {
    let choice = response["choices"]
        .get(0)
        .ok_or_else(|| CrewError::llm("response contained no choices"))?;
    let message = &choice["message"];

    let content = message["content"].as_str().unwrap_or("").to_string();

    let mut tool_calls = Vec::new();
    if let Some(calls) = message["tool_calls"].as_array() {
        for call in calls {
            let Some(function) = call["function"].as_object() else {
                continue;
            };
            let id = call["id"]
                .as_str()
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
            let name = function
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let arguments: HashMap<String, Value> = match function.get("arguments") {
                Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or_default(),
                Some(Value::Object(map)) => map.clone().into_iter().collect(),
                _ => HashMap::new(),
            };
            tool_calls.push(ToolCall::new(id, name, arguments));
        }
    }

    let done = tool_calls.is_empty();
    Ok(CompletionResponse {
        content,
        tool_calls,
        done,
    })
}
