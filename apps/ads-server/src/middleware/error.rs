//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use ads_core::RepoError;
use ads_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::InvalidIdentifier(id) => {
                AppError::BadRequest(format!("invalid ad id {:?}", id))
            }
            RepoError::NotFound(id) => AppError::NotFound(format!("ad {} not found", id)),
            RepoError::Invalid(e) => AppError::BadRequest(e.to_string()),
            RepoError::Storage(msg) => {
                tracing::error!("Database error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Encoding(msg) => {
                tracing::error!("Identifier encoding error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use ads_core::DomainError;

    use super::*;

    #[test]
    fn repo_errors_map_to_status_codes() {
        let cases = [
            (RepoError::InvalidIdentifier("x".into()), StatusCode::BAD_REQUEST),
            (RepoError::NotFound("abc".into()), StatusCode::NOT_FOUND),
            (
                RepoError::Invalid(DomainError::InvalidSortOrder("up".into())),
                StatusCode::BAD_REQUEST,
            ),
            (RepoError::Storage("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (RepoError::Encoding("Int32".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let err = AppError::from(RepoError::Storage("auth failed for admin".into()));
        assert!(!err.to_string().contains("admin"));
    }
}
