//! Router configuration and server setup.

use std::future::Future;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/sessions/:id", get(handlers::get_session))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and runs it until `shutdown` resolves.
pub async fn serve<F>(config: &ApiConfig, state: AppState, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
