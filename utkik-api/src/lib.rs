//! # utkik-api
//!
//! REST control surface over the capture controller. Four operational
//! endpoints mirror the capture lifecycle (start, stop, urls, suspicious),
//! plus a status snapshot and a Prometheus exposition endpoint. CORS is
//! wide open; the API is meant to sit behind a local dashboard.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::ApiState;

/// Builds the probe's router.
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/capture/start", post(handlers::start_capture))
        .route("/api/capture/stop", post(handlers::stop_capture))
        .route("/api/capture/status", get(handlers::capture_status))
        .route("/api/urls", get(handlers::detected_urls))
        .route("/api/suspicious", get(handlers::suspicious_connections))
        .route("/metrics", get(handlers::metrics))
        .layer(cors)
        .with_state(state)
}

/// Binds and serves the API until the process exits.
pub async fn serve(addr: SocketAddr, state: Arc<ApiState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("control api listening on {addr}");
    axum::serve(listener, router(state)).await
}
