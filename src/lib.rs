//! Application services for Intelli Summarize.
//!
//! [`App`] ties the relational [`Store`], the upload [`FileStore`] and the
//! [`SummaryEngine`] together. Every HTTP operation maps onto one `App`
//! method; the server crate only parses requests and renders responses.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use intelli_summarize::{App, AppConfig, LocalFileStore, RetryConfig, Store, SummaryEngine};
//! use std::sync::Arc;
//!
//! let store = Store::connect("sqlite://intelli_summarize.db").await?;
//! store.init_schema().await?;
//! let files = LocalFileStore::open("uploads").await?;
//! let app = App::new(
//!     store,
//!     Arc::new(files),
//!     SummaryEngine::placeholder(RetryConfig::default()),
//!     AppConfig::default(),
//! );
//! let user = app.signup("Ada", "ada@example.com", "hunter2").await?;
//! let session = app.login("ada@example.com", "hunter2").await?;
//! assert_eq!(user.user_id, session.user_id);
//! # Ok(())
//! # }
//! ```

pub mod annotations;
pub mod auth;
pub mod config;
pub mod documents;
pub mod error;
pub mod feedback;
pub mod files;
mod password;
pub mod summaries;

pub use crate::annotations::AnnotationInput;
pub use crate::auth::{AUTH_REQUIRED, IssuedSession};
pub use crate::config::AppConfig;
pub use crate::documents::{SweepReport, UploadOutcome, UploadedFile};
pub use crate::error::{AppError, AppResult, INVALID_CREDENTIALS};
pub use crate::feedback::{FeedbackReceipt, SNAPSHOT_WARNING};
pub use crate::files::{FileStore, LocalFileStore, StoredFile};
pub use crate::summaries::SummaryRequest;

pub use store::{Annotation, Document, Feedback, Flashcard, Store, StoreError, Summary, User};
pub use summarize::{
    FlashcardPair, PlaceholderProvider, RetryConfig, SummarizeError, SummaryEngine,
    SummaryLength, SummaryProvider,
};

use std::sync::Arc;

/// Shared application services. Cheap to clone.
#[derive(Clone)]
pub struct App {
    store: Store,
    files: Arc<dyn FileStore>,
    engine: SummaryEngine,
    config: AppConfig,
}

impl App {
    pub fn new(
        store: Store,
        files: Arc<dyn FileStore>,
        engine: SummaryEngine,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            files,
            engine,
            config,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn files(&self) -> &dyn FileStore {
        self.files.as_ref()
    }

    pub fn engine(&self) -> &SummaryEngine {
        &self.engine
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store)
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// App over a fresh SQLite file and upload directory, both inside the
    /// returned temp dir.
    pub async fn temp_app() -> (App, TempDir) {
        temp_app_with(AppConfig::default()).await
    }

    pub async fn temp_app_with(config: AppConfig) -> (App, TempDir) {
        let dir = TempDir::new().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("app.db").display());
        let store = Store::connect(&url).await.expect("connect");
        store.init_schema().await.expect("schema");
        let files = LocalFileStore::open(dir.path().join("uploads"))
            .await
            .expect("upload dir");
        let app = App::new(
            store,
            Arc::new(files),
            SummaryEngine::placeholder(RetryConfig::immediate(0)),
            config,
        );
        (app, dir)
    }

    /// Sign up and return the new user's id.
    pub async fn user(app: &App, email: &str) -> i64 {
        app.signup("Test", email, "pw").await.expect("signup").user_id
    }
}
