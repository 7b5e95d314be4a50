// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with the status codes and envelope the admin UI expects.
///
/// Validation failures are detected before any store mutation and returned
/// with the first failing field's message. Storage failures are caught at the
/// handler boundary and surfaced as 500 with the underlying message attached
/// for diagnostics.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidInput(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (uniqueness violation)
    Conflict(String),

    // 500 Internal Server Error (holds the underlying store detail)
    StorageFailure(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::StorageFailure(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidInput(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::StorageFailure(_) => "Internal Server Error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::StorageFailure(detail) => json!({
                "success": false,
                "message": self.message(),
                "error": detail,
            }),
            _ => json!({
                "success": false,
                "message": self.message(),
            }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn storage_failure(message: impl Into<String>) -> Self {
        ApiError::StorageFailure(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::services::StoreError> for ApiError {
    fn from(err: crate::services::StoreError) -> Self {
        match err {
            crate::services::StoreError::NotFound(msg) => ApiError::not_found(msg),
            crate::services::StoreError::Conflict(msg) => ApiError::conflict(msg),
            crate::services::StoreError::Sqlx(e) => {
                tracing::error!("database error: {}", e);
                ApiError::storage_failure(e.to_string())
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::StorageFailure(detail) => write!(f, "{}: {}", self.message(), detail),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
