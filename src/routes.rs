use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{health, users};
use crate::middleware::{error::error_handling_middleware, request_id::request_id_middleware};
use crate::state::AppState;

/// Create the main application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Health routes
    let health_routes = Router::new().route("/health", get(health::health_check));

    // User routes - /users
    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::replace_user)
                .patch(users::patch_user)
                .delete(users::delete_user),
        );

    // Main router combining all routes
    Router::new()
        .merge(health_routes)
        .merge(user_routes)
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(error_handling_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Generic response for requests that match no route
async fn route_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" }))).into_response()
}
