//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. Services are generic over repository/provider/hasher
//! traits; AppState pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use careerpath_core::account::service::AccountService;
use careerpath_core::chat::service::{ChatService, ChatSettings};
use careerpath_core::llm::box_provider::BoxLlmProvider;
use careerpath_infra::config::{load_global_config, resolve_api_key};
use careerpath_infra::crypto::password::Argon2CredentialHasher;
use careerpath_infra::data_dir::resolve_data_dir;
use careerpath_infra::llm::{create_provider, MissingKeyProvider};
use careerpath_infra::sqlite::chat::SqliteChatRepository;
use careerpath_infra::sqlite::pool::{database_url, DatabasePool};
use careerpath_infra::sqlite::user::SqliteUserRepository;
use careerpath_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService =
    ChatService<SqliteChatRepository, SqliteUserRepository, BoxLlmProvider>;

pub type ConcreteAccountService = AccountService<SqliteUserRepository, Argon2CredentialHasher>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub account_service: Arc<ConcreteAccountService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    /// Whether an API key was found for the configured provider.
    pub llm_configured: bool,
}

impl AppState {
    /// Initialize the application state: load config, open the database,
    /// build the completion provider and wire the services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;

        let (provider, llm_configured) = match resolve_api_key(&config.llm) {
            Some(key) => (create_provider(&config.llm, Some(key))?, true),
            None => {
                tracing::warn!(
                    env = %config.llm.api_key_env,
                    "No API key set; chat completions will fail until it is provided"
                );
                (BoxLlmProvider::new(MissingKeyProvider::new(&config.llm)), false)
            }
        };

        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
            provider,
            ChatSettings::from(&config),
        );

        let account_service = AccountService::new(
            SqliteUserRepository::new(db_pool),
            Argon2CredentialHasher::new(),
            config.auth.token_ttl_hours,
        );

        tracing::debug!(data_dir = %data_dir.display(), "Application state initialized");

        Ok(Self {
            chat_service: Arc::new(chat_service),
            account_service: Arc::new(account_service),
            config: Arc::new(config),
            data_dir,
            llm_configured,
        })
    }
}
