//! Intelli Summarize server: HTTP API and pages.
//!
//! Exposes the application services of `intelli_summarize` over axum:
//!
//! - **Accounts**: signup, login (session token plus `HttpOnly` cookie), logout
//! - **Documents**: single and multi-file uploads, per-user listing
//! - **Annotations**: add, list by document, owner-only update and delete
//! - **Summaries & flashcards**: generation through the summarization engine
//! - **Feedback**: ratings on summaries, with a JSON snapshot per row
//! - **Health**: liveness and readiness probes
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public
//!
//! - `GET /health`, `GET /ready`
//! - `POST /api/v1/auth/signup`, `POST /api/v1/auth/login`
//! - `GET /`, `/login`, `/signup`, `/dashboard`, `/preview_page_v2.html`
//!
//! ## Session required (`Authorization: Bearer <token>` or `session` cookie)
//!
//! - `POST /api/v1/auth/logout`
//! - `POST /api/v1/documents/upload`, `POST /api/v1/documents/upload-multiple`
//! - `GET /api/v1/documents`
//! - `POST /api/v1/annotations/{add,update,delete}`, `GET /api/v1/annotations?document_id=`
//! - `POST /api/v1/summaries/generate`, `GET /api/v1/summaries`
//! - `POST /api/v1/flashcards/generate`, `GET /api/v1/flashcards`
//! - `POST /api/v1/feedback`, `GET /api/v1/feedback`
//!
//! Non-upload bodies are form-encoded. Errors are `{"error": "<message>"}`.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
