//! LlmProvider trait definition.
//!
//! The completion collaborator consumed by the chat service. Uses RPITIT for
//! `complete`; `BoxLlmProvider` supplies dynamic dispatch on top.

use careerpath_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities,
};

/// Trait for LLM provider backends (Groq, OpenAI, any OpenAI-compatible API).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in careerpath-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "groq", "openai").
    fn name(&self) -> &str;

    /// Context and output limits of the configured model.
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send the ordered prompt units and receive the generated text.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
