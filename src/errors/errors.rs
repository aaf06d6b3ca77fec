use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Main error type for the user service
///
/// Every failure a request can surface is one of these variants; handlers
/// and the store never leak backend-specific error encodings past this
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    // Client input errors
    InvalidId,
    InvalidName,
    InvalidEmail,
    InvalidAge,
    EmptyUpdate,
    MalformedBody,

    // Storage outcomes
    NotFound,
    EmailConflict,

    // Catch-all for storage/runtime failures
    Unexpected(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidId => write!(f, "Invalid ID parameter"),
            ServiceError::InvalidName => write!(f, "Valid name is required"),
            ServiceError::InvalidEmail => write!(f, "Valid email is required"),
            ServiceError::InvalidAge => write!(f, "Age must be a positive integer"),
            ServiceError::EmptyUpdate => write!(f, "No valid update data provided"),
            ServiceError::MalformedBody => write!(f, "Invalid JSON"),
            ServiceError::NotFound => write!(f, "User not found"),
            ServiceError::EmailConflict => write!(f, "Email already exists"),
            ServiceError::Unexpected(_) => write!(f, "Something went wrong!"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ServiceError::InvalidId
            | ServiceError::InvalidName
            | ServiceError::InvalidEmail
            | ServiceError::InvalidAge
            | ServiceError::EmptyUpdate
            | ServiceError::MalformedBody => StatusCode::BAD_REQUEST,

            // 404 Not Found
            ServiceError::NotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            ServiceError::EmailConflict => StatusCode::CONFLICT,

            // 500 Internal Server Error
            ServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Implement IntoResponse for Axum integration
///
/// Unexpected failures carry the detail through to the caller in a
/// `message` field and get logged in full; every other variant is a flat
/// `{"error": ...}` body.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServiceError::Unexpected(detail) => {
                tracing::error!(detail = %detail, "Unexpected failure while handling request");
                json!({ "error": self.to_string(), "message": detail })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for Results using ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        for error in [
            ServiceError::InvalidId,
            ServiceError::InvalidName,
            ServiceError::InvalidEmail,
            ServiceError::InvalidAge,
            ServiceError::EmptyUpdate,
            ServiceError::MalformedBody,
        ] {
            assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_storage_outcome_status_codes() {
        assert_eq!(ServiceError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::EmailConflict.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Unexpected("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_matches_response_contract() {
        assert_eq!(ServiceError::InvalidId.to_string(), "Invalid ID parameter");
        assert_eq!(ServiceError::NotFound.to_string(), "User not found");
        assert_eq!(
            ServiceError::EmailConflict.to_string(),
            "Email already exists"
        );
        assert_eq!(
            ServiceError::Unexpected("pool timed out".to_string()).to_string(),
            "Something went wrong!"
        );
    }
}
