use crate::config::ServerConfig;
use intelli_summarize::{App, LocalFileStore, Store, SummaryEngine};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Application services (store, upload directory, summarizer)
    pub app: App,
}

impl ServerState {
    /// Open the database and upload directory named in `config`.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let store = Store::connect(&config.database_url).await?;
        store.init_schema().await?;

        let files = LocalFileStore::open(&config.upload_dir).await?;
        let engine = SummaryEngine::placeholder(config.retry_config());

        info!(
            database_url = %config.database_url,
            upload_dir = %files.root().display(),
            provider = engine.provider_name(),
            "server state ready"
        );

        let app = App::new(store, Arc::new(files), engine, config.app_config());
        Ok(Self::with_app(config, app))
    }

    /// Wrap already-built services.
    pub fn with_app(config: ServerConfig, app: App) -> Self {
        Self {
            config: Arc::new(config),
            app,
        }
    }
}
