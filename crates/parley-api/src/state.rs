//! Application state wiring all services together.
//!
//! Services are generic over the repository trait; AppState pins them to
//! the SQLite implementation and shares one provider registry.

use std::sync::Arc;

use anyhow::Context;
use parley_core::prompt::dispatch::ChatDispatcher;
use parley_core::prompt::service::PromptService;
use parley_infra::config::{database_url, load_config, resolve_data_dir};
use parley_infra::llm::build_registry;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::prompt::SqlitePromptRepository;
use parley_types::config::ParleyConfig;

pub type ConcretePromptService = PromptService<SqlitePromptRepository>;

pub type ConcreteDispatcher = ChatDispatcher<SqlitePromptRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub prompt_service: Arc<ConcretePromptService>,
    pub dispatcher: Arc<ConcreteDispatcher>,
    pub config: ParleyConfig,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, build
    /// the provider registry, wire services. The dispatcher owns the provider registry.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("Failed to open database")?;

        let providers = Arc::new(build_registry(&config));

        let prompt_service = PromptService::new(SqlitePromptRepository::new(db_pool.clone()));
        let dispatcher = ChatDispatcher::new(
            SqlitePromptRepository::new(db_pool),
            Arc::clone(&providers),
        )
        .with_history_window(config.history_window);

        Ok(Self {
            prompt_service: Arc::new(prompt_service),
            dispatcher: Arc::new(dispatcher),
            config,
        })
    }
}
