//! Predicate HTTP Routes
//!
//! `GET /predicates` lists registered predicates, `POST /compute` runs a
//! batch against one of them.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::predicates::{
    BatchDispatcher, ComputationBatch, ComputationResult, PredicateDescriptor, PredicateError,
    PredicateRegistry,
};

// ==================
// Shared State
// ==================

/// Predicate state shared across handlers
#[derive(Clone)]
pub struct PredicateState {
    pub dispatcher: BatchDispatcher,
}

impl PredicateState {
    pub fn new(registry: Arc<PredicateRegistry>) -> Self {
        Self {
            dispatcher: BatchDispatcher::new(registry),
        }
    }

    pub fn registry(&self) -> &Arc<PredicateRegistry> {
        self.dispatcher.registry()
    }
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: u16,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a predicate error to its HTTP response
pub fn error_response(err: PredicateError) -> ApiError {
    let code = err.status_code();
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse {
            detail: err.to_string(),
            code,
        }),
    )
}

// ==================
// Predicate Routes
// ==================

/// Create predicate routes
pub fn predicate_routes(state: Arc<PredicateState>) -> Router {
    Router::new()
        .route("/predicates", get(list_predicates_handler))
        .route("/compute", post(compute_handler))
        .with_state(state)
}

async fn list_predicates_handler(
    State(state): State<Arc<PredicateState>>,
) -> Json<Vec<PredicateDescriptor>> {
    Json(state.registry().list())
}

/// Callbacks are synchronous user code, so the batch runs on the blocking pool
async fn compute_handler(
    State(state): State<Arc<PredicateState>>,
    Json(batch): Json<ComputationBatch>,
) -> Result<Json<ComputationResult>, ApiError> {
    let dispatcher = state.dispatcher.clone();

    let outcome = tokio::task::spawn_blocking(move || dispatcher.execute(&batch))
        .await
        .map_err(|e| error_response(PredicateError::Internal(format!("compute task failed: {}", e))))?
        .map_err(error_response)?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_not_found() {
        let (status, Json(body)) = error_response(PredicateError::NotFound("urn:x".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, 404);
        assert!(body.detail.contains("urn:x"));
    }

    #[test]
    fn test_state_creation() {
        let state = PredicateState::new(Arc::new(PredicateRegistry::new()));
        assert!(state.registry().is_empty());
    }
}
