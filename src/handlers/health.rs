use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::features::{FEATURE_NAMES, N_FEATURES};
use crate::handlers::page::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "insurance-predictor",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Artifacts are loaded before the listener binds, so a running server is ready
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "ready",
        "service": "insurance-predictor",
        "model": {
            "trees": state.model.n_trees,
            "max_depth": state.model.max_depth,
            "features": N_FEATURES,
            "feature_order": FEATURE_NAMES,
        },
    })))
}
