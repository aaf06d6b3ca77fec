use axum::{extract::Request, http::header, middleware::Next, response::Response};
use uuid::Uuid;

/// Middleware to add a unique request ID to each request
/// The request ID is added to both the request extensions and response headers
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();

    // Add to request extensions for use in handlers
    request.extensions_mut().insert(request_id);

    tracing::info!(
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        "Incoming request"
    );

    let mut response = next.run(request).await;

    // Add request ID to response headers
    if let Ok(value) = request_id.to_string().parse() {
        response
            .headers_mut()
            .insert(header::HeaderName::from_static("x-request-id"), value);
    }

    response
}
