pub mod achievements;
pub mod chat;
pub mod config;
pub mod journal;
pub mod moods;
pub mod observability;
pub mod rest;
pub mod selfcare;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;

use chat::provider::ChatClient;
use config::HavenConfig;
use storage::Storage;

/// Shared application state passed to every REST handler and background task.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<HavenConfig>,
    pub storage: Arc<Storage>,
    /// Upstream chat-completions client for the AI companion.
    pub chat: ChatClient,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Open storage, seed the activity catalog, validate the achievement
    /// catalog, and wire up the upstream chat client.
    pub async fn new(config: HavenConfig, chat_api_key: Option<String>) -> Result<Arc<Self>> {
        achievements::catalog::validate()?;

        let storage = Storage::new_with_slow_query(
            &config.data_dir,
            config.observability.slow_query_threshold_ms,
        )
        .await?;
        selfcare::seed::seed_catalog(&storage).await?;

        let chat = ChatClient::new(&config.chat, chat_api_key)?;

        Ok(Arc::new(Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            chat,
            started_at: std::time::Instant::now(),
        }))
    }
}
