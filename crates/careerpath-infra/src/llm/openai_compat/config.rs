//! Configuration types and per-provider presets for OpenAI-compatible providers.
//!
//! Each preset returns an [`OpenAiCompatConfig`] with the right base URL and
//! model limits. Any other OpenAI-compatible endpoint can be reached by
//! building the config directly.

use careerpath_types::llm::ProviderCapabilities;
use secrecy::SecretString;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "groq", "openai").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.groq.com/openai/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Default model, used when a request leaves the model empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

/// Groq preset.
///
/// Base URL: `https://api.groq.com/openai/v1`
/// Limits: 131K context, 65K output (gpt-oss family).
pub fn groq_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "groq".into(),
        base_url: GROQ_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            max_context_tokens: 131_072,
            max_output_tokens: 65_536,
        },
    }
}

/// OpenAI preset.
///
/// Base URL: `https://api.openai.com/v1`
/// Limits: 128K context, 16K output.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_defaults() {
        let config = groq_defaults(SecretString::from("gsk-test"), "openai/gpt-oss-20b");
        assert_eq!(config.provider_name, "groq");
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "openai/gpt-oss-20b");
    }

    #[test]
    fn test_openai_defaults() {
        let config = openai_defaults(SecretString::from("sk-test"), "gpt-4o-mini");
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.capabilities.max_output_tokens, 16_384);
    }
}
