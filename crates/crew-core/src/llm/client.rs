//! LLM client abstraction

use super::{CompletionOptions, CompletionResponse, LlmMessage};
use crate::error::CrewResult;
use crate::tools::ToolSchema;
use async_trait::async_trait;

/// A chat-completion backend with tool calling.
///
/// Implementations must be shareable across concurrently running agents.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Request one completion for the full message history
    async fn complete(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolSchema],
        options: &CompletionOptions,
    ) -> CrewResult<CompletionResponse>;
}
