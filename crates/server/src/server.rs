//! Server initialization and routing
//!
//! Router assembly, the middleware stack, startup housekeeping, and
//! graceful shutdown.

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{
    annotations, auth, documents, feedback, health, method_not_allowed, pages, summaries,
};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: pages, `/health`, `/ready`, signup and login
/// - Protected routes: every other `/api/v1/*` endpoint; their handlers
///   take an [`AuthUser`](crate::extract::AuthUser)
///
/// A known path hit with the wrong method answers 405 without touching
/// storage. Unknown `/api/` paths answer 404; other unknown paths serve the
/// home page.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/preview_page_v2.html", get(pages::home))
        .route("/login", get(pages::login))
        .route("/signup", get(pages::signup))
        .route("/dashboard", get(pages::dashboard))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login));

    let upload_routes = Router::new()
        .route("/api/v1/documents/upload", post(documents::upload_single))
        .route(
            "/api/v1/documents/upload-multiple",
            post(documents::upload_multiple),
        )
        .layer(DefaultBodyLimit::max(state.config.max_upload_size()));

    let protected_routes = Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .merge(upload_routes)
        .route("/api/v1/documents", get(documents::list_documents))
        .route("/api/v1/annotations", get(annotations::get_annotations))
        .route("/api/v1/annotations/add", post(annotations::add_annotation))
        .route(
            "/api/v1/annotations/update",
            post(annotations::update_annotation),
        )
        .route(
            "/api/v1/annotations/delete",
            post(annotations::delete_annotation),
        )
        .route(
            "/api/v1/summaries/generate",
            post(summaries::generate_summary),
        )
        .route("/api/v1/summaries", get(summaries::list_summaries))
        .route(
            "/api/v1/flashcards/generate",
            post(summaries::generate_flashcards),
        )
        .route("/api/v1/flashcards", get(summaries::list_flashcards))
        .route(
            "/api/v1/feedback",
            get(feedback::list_feedback).post(feedback::give_feedback),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(pages::fallback)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = if config.log_json {
        builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        eprintln!("tracing subscriber already installed: {err}");
    }
}

/// Startup housekeeping: drop expired sessions and, when enabled, remove
/// uploads no document row references.
pub async fn housekeeping(state: &ServerState) {
    match state.app.purge_expired_sessions().await {
        Ok(removed) => tracing::info!(removed, "expired sessions purged"),
        Err(err) => tracing::warn!(error = %err, "failed to purge expired sessions"),
    }

    if state.config.sweep_orphans_on_start {
        let grace = state.app.config().orphan_grace();
        if let Err(err) = state.app.sweep_orphans(grace).await {
            tracing::warn!(error = %err, detail = ?err.detail(), "orphan sweep failed");
        }
    }
}

/// Start the Intelli Summarize HTTP server
///
/// Blocks until the server is shut down via SIGTERM or Ctrl+C.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config);
    config.validate()?;

    let state = Arc::new(ServerState::new(config.clone()).await?);
    housekeeping(&state).await;

    let app = build_router(state.clone());
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(%addr, "Starting Intelli Summarize server");
    tracing::info!(
        timeout_secs = config.timeout_secs,
        max_upload_size_mb = config.max_upload_size_mb,
        enable_cors = config.enable_cors,
        "server limits"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.app.store().close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
