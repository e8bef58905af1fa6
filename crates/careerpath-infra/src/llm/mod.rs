//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `careerpath-core`, plus a factory ([`create_provider`])
//! that builds it from the `[llm]` config section.
//!
//! [`LlmProvider`]: careerpath_core::llm::provider::LlmProvider

pub mod openai_compat;

use secrecy::SecretString;

use careerpath_core::llm::box_provider::BoxLlmProvider;
use careerpath_core::llm::provider::LlmProvider;
use careerpath_types::config::LlmConfig;
use careerpath_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, PromptUnit, ProviderCapabilities,
};

use self::openai_compat::config::{OpenAiCompatConfig, groq_defaults, openai_defaults};
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from the `[llm]` config section.
///
/// `provider` selects a preset ("groq" or "openai"); `base_url` overrides
/// the preset's endpoint and allows any other provider name.
pub fn create_provider(
    config: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;

    let mut oai_config = match config.provider.as_str() {
        "groq" => groq_defaults(key, &config.model),
        "openai" => openai_defaults(key, &config.model),
        other => match config.base_url.as_deref() {
            Some(_) => OpenAiCompatConfig {
                provider_name: other.to_string(),
                base_url: String::new(),
                api_key: key,
                model: config.model.clone(),
                // Unknown endpoint: assume OpenAI-sized limits.
                capabilities: ProviderCapabilities {
                    max_context_tokens: 128_000,
                    max_output_tokens: 16_384,
                },
            },
            None => {
                return Err(LlmError::InvalidRequest(format!(
                    "unknown provider '{other}' (set llm.base_url for custom endpoints)"
                )));
            }
        },
    };

    if let Some(base_url) = config.base_url.as_deref() {
        oai_config.base_url = base_url.trim_end_matches('/').to_string();
    }

    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai_config)))
}

/// Stand-in used when no API key is configured.
///
/// Lets the server and the read-only CLI commands run; every completion
/// fails with [`LlmError::AuthenticationFailed`].
pub struct MissingKeyProvider {
    provider_name: String,
    api_key_env: String,
    capabilities: ProviderCapabilities,
}

impl MissingKeyProvider {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            provider_name: config.provider.clone(),
            api_key_env: config.api_key_env.clone(),
            capabilities: ProviderCapabilities {
                max_context_tokens: 0,
                max_output_tokens: 0,
            },
        }
    }
}

impl LlmProvider for MissingKeyProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::warn!(env = %self.api_key_env, "Completion requested but no API key is set");
        Err(LlmError::AuthenticationFailed)
    }
}

/// Send a one-word completion to verify the key and endpoint.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(),
        messages: vec![PromptUnit::new(MessageRole::User, "Hello")],
        max_tokens: 10,
        temperature: Some(0.0),
    };
    provider.complete(&request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Option<SecretString> {
        Some(SecretString::from("test-key"))
    }

    #[test]
    fn test_create_provider_groq_default() {
        let provider = create_provider(&LlmConfig::default(), key()).unwrap();
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn test_create_provider_openai() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config, key()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_provider_custom_endpoint() {
        let config = LlmConfig {
            provider: "local".to_string(),
            base_url: Some("http://localhost:11434/v1/".to_string()),
            model: "llama3".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config, key()).unwrap();
        assert_eq!(provider.name(), "local");
    }

    #[test]
    fn test_create_provider_unknown_without_base_url() {
        let config = LlmConfig {
            provider: "mystery".to_string(),
            ..Default::default()
        };
        let result = create_provider(&config, key());
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_key_provider_fails_completions() {
        let provider = BoxLlmProvider::new(MissingKeyProvider::new(&LlmConfig::default()));
        assert_eq!(provider.name(), "groq");
        let result = test_provider_connection(&provider).await;
        assert!(matches!(result, Err(LlmError::AuthenticationFailed)));
    }

    #[test]
    fn test_create_provider_missing_key() {
        let result = create_provider(&LlmConfig::default(), None);
        match result {
            Err(LlmError::AuthenticationFailed) => {}
            Err(other) => panic!("Expected AuthenticationFailed, got: {other}"),
            Ok(_) => panic!("Expected error but got Ok"),
        }
    }
}
