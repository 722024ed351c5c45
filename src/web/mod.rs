//! Upload-and-filter web front end.

pub mod form;
pub mod handlers;
pub mod render;
pub mod session;

use crate::config::toml_config::ServerConfig;
use crate::utils::error::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use session::SessionStore;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let sessions = SessionStore::new(config.session_ttl(), config.session.max_sessions);
        Self {
            config: Arc::new(config),
            sessions,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/download", get(handlers::download))
        .route("/reset", post(handlers::reset))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let bind = config.server.bind.clone();
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
