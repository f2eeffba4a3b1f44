//! Observability HTTP Routes
//!
//! Health check and compute counters.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::observability::MetricsSnapshot;

use super::predicate_routes::PredicateState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub predicates_registered: usize,
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
}

/// Create observability routes
pub fn observability_routes(state: Arc<PredicateState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn metrics_handler(State(state): State<Arc<PredicateState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        predicates_registered: state.registry().len(),
        counters: state.dispatcher.metrics().snapshot(),
    })
}
