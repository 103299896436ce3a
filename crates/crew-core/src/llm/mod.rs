//! LLM collaborator boundary
//!
//! The agent loop only sees [`LlmClient`]; [`OpenAiClient`] is the one
//! concrete backend, covering OpenAI and OpenAI-compatible servers.

mod client;
mod messages;
mod openai;

pub use client::LlmClient;
pub use messages::{CompletionOptions, CompletionResponse, LlmMessage, MessageRole};
pub use openai::{OpenAiClient, build_request_body, parse_response};
