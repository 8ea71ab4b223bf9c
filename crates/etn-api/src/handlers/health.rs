//! Health check handler

use crate::state::{AppState, IdentityStatus};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub store: String,
    pub identity: String,
}

/// Report whether uploads and views can be served.
///
/// Always 200: a degraded service still answers requests, with 503 on the
/// operations that need the backend.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = if state.is_ready() { "ready" } else { "degraded" };
    let store = state
        .store_backend
        .map(|b| b.to_string())
        .unwrap_or_else(|| "unavailable".to_string());
    let identity = match state.identity {
        IdentityStatus::SignedIn => "signed_in",
        IdentityStatus::Anonymous => "anonymous",
        IdentityStatus::Unavailable => "unavailable",
    };

    (
        StatusCode::OK,
        Json(HealthCheckResponse {
            status: status.to_string(),
            store,
            identity: identity.to_string(),
        }),
    )
}
