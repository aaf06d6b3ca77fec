use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use crate::errors::errors::{ServiceError, ServiceResult};
use crate::state::AppState;

/// GET /health
/// Report service liveness and database connectivity
#[instrument(skip_all, fields(service = "/health"))]
pub async fn health_check(State(state): State<AppState>) -> ServiceResult<Response> {
    info!("Health check request received");

    let health = state
        .db
        .health_check()
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;

    Ok((StatusCode::OK, Json(health)).into_response())
}
