use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::datalayer::User;
use crate::errors::errors::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::validation::users::{validate_id_param, validate_user_changes, validate_user_input};

// ===== RESPONSE DTOs =====

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub user: User,
}

// ===== HANDLERS =====

/// GET /users
/// List all users, ordered ascending by id
#[instrument(skip_all, fields(service = "/users"))]
pub async fn list_users(State(state): State<AppState>) -> ServiceResult<Response> {
    let users = state.users.list_all().await?;

    info!(count = users.len(), "Users listed");
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// GET /users/:id
/// Get a single user
#[instrument(skip_all, fields(service = "/users/:id"))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Response> {
    let id = validate_id_param(&id)?;

    let user = state.users.get_by_id(id).await?;

    info!(user_id = user.id, "User retrieved");
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// POST /users
/// Create a new user
///
/// Body parsing is checked first, then the full input rules; the store is
/// only reached with a normalized payload.
#[instrument(skip_all, fields(service = "/users"))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServiceResult<Response> {
    let Json(body) = payload.map_err(|_| ServiceError::MalformedBody)?;
    let input = validate_user_input(&body)?;

    info!(email = %input.email, "Creating user");
    let user = state.users.create(&input).await?;

    info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// PUT /users/:id
/// Replace all mutable fields of a user
#[instrument(skip_all, fields(service = "/users/:id"))]
pub async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServiceResult<Response> {
    let Json(body) = payload.map_err(|_| ServiceError::MalformedBody)?;
    let id = validate_id_param(&id)?;
    let input = validate_user_input(&body)?;

    info!(user_id = id, email = %input.email, "Replacing user");
    let user = state.users.replace(id, &input).await?;

    info!(user_id = user.id, "User replaced");
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// PATCH /users/:id
/// Update only the supplied fields of a user
#[instrument(skip_all, fields(service = "/users/:id"))]
pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServiceResult<Response> {
    let Json(body) = payload.map_err(|_| ServiceError::MalformedBody)?;
    let id = validate_id_param(&id)?;
    let changes = validate_user_changes(&body)?;

    info!(
        user_id = id,
        name = changes.name.is_some(),
        email = changes.email.is_some(),
        age = changes.age.is_some(),
        "Patching user"
    );
    let user = state.users.patch(id, &changes).await?;

    info!(user_id = user.id, "User patched");
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// DELETE /users/:id
/// Remove a user and return its last-known state
#[instrument(skip_all, fields(service = "/users/:id"))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Response> {
    let id = validate_id_param(&id)?;

    let user = state.users.delete(id).await?;

    info!(user_id = user.id, "User deleted");
    let response = DeleteUserResponse {
        message: "User deleted successfully".to_string(),
        user,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}
