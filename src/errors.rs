// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: One enum for every failure the service can surface
/// Provider failures map to ExternalApiError, persistence failures to DatabaseError.
/// Per-place enrichment failures never reach this type's HTTP mapping: the resolver
/// logs and drops them.
#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Place not found with id: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Photo storage error: {0}")]
    StorageError(String),

    /// Upstream provider quota exhausted
    #[error("Places provider quota exceeded")]
    RateLimitExceeded,
}

impl From<sqlx::Error> for PlacesError {
    fn from(e: sqlx::Error) -> Self {
        PlacesError::DatabaseError(e.to_string())
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let error_code = match self {
            PlacesError::NotFound(_) => "NOT_FOUND",
            PlacesError::DatabaseError(_) => "DATABASE_ERROR",
            PlacesError::InvalidInput(_) => "INVALID_INPUT",
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::Unauthorized => "UNAUTHORIZED",
            PlacesError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            PlacesError::StorageError(_) => "STORAGE_ERROR",
            PlacesError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        let mut response = HttpResponse::build(self.status_code());
        if let PlacesError::Unauthorized = self {
            response.insert_header((header::WWW_AUTHENTICATE, r#"Basic realm="Hungries API""#));
        }
        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlacesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlacesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PlacesError::Unauthorized => StatusCode::UNAUTHORIZED,
            PlacesError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            PlacesError::StorageError(_) => StatusCode::BAD_GATEWAY,
            PlacesError::RateLimitExceeded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
