//! Global configuration types for careerpath.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! completion provider, the history token budget, token lifetime and the
//! HTTP listener. Every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Token budget for conversation history in a context window.
pub const DEFAULT_HISTORY_TOKEN_BUDGET: i64 = 4_000;

/// Top-level configuration, loaded from `~/.careerpath/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider preset: "groq" or "openai".
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Overrides the preset's base URL (any OpenAI-compatible endpoint).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f64>,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_model() -> String {
    "openai/gpt-oss-20b".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    2_048
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

/// Chat behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Approximate token budget (chars / 4) for history in each request.
    #[serde(default = "default_history_token_budget")]
    pub history_token_budget: i64,
}

fn default_history_token_budget() -> i64 {
    DEFAULT_HISTORY_TOKEN_BUDGET
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_token_budget: default_history_token_budget(),
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of an issued bearer token, in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24 * 30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

/// HTTP listener settings (overridable from the command line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
