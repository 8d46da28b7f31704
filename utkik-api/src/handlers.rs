//! Request handlers.
//!
//! Query endpoints never fail the request: a read error comes back as a
//! `200` with an empty list and an `error` field, so a dashboard polling
//! them keeps rendering between sessions.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub interface: Option<String>,
    pub filter_str: Option<String>,
}

pub async fn start_capture(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<StartParams>,
) -> Response {
    match state
        .controller
        .start(params.interface, params.filter_str)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn stop_capture(State(state): State<Arc<ApiState>>) -> Response {
    match state.controller.stop().await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn capture_status(State(state): State<Arc<ApiState>>) -> Response {
    Json(state.controller.status()).into_response()
}

pub async fn detected_urls(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    match state.controller.urls() {
        Ok(urls) => Json(json!({ "urls": urls })),
        Err(err) => Json(json!({ "urls": [], "error": err.to_string() })),
    }
}

pub async fn suspicious_connections(
    State(state): State<Arc<ApiState>>,
) -> Json<serde_json::Value> {
    match state.controller.suspicious_connections() {
        Ok(connections) => Json(json!({ "connections": connections })),
        Err(err) => Json(json!({ "connections": [], "error": err.to_string() })),
    }
}

pub async fn metrics(State(state): State<Arc<ApiState>>) -> Response {
    match state.controller.metrics().gather_metrics() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(err) => internal_error(err),
    }
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    error!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}
