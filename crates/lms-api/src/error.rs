use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for every handler.
///
/// Validation and authorization failures are detected before any write and
/// returned immediately; persistence failures inside a transaction roll the
/// whole operation back and surface the original cause rather than a bare
/// generic message.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or out-of-domain input.
    #[error("{0}")]
    Validation(String),
    /// A referenced entity does not exist (or is not visible to the caller).
    #[error("{0}")]
    NotFound(String),
    /// The caller is authenticated but not allowed to act on the target.
    #[error("{0}")]
    Forbidden(String),
    /// The request conflicts with existing state (duplicate enrollment,
    /// attempt cap reached, duplicate ordering position).
    #[error("{0}")]
    Conflict(String),
    /// Missing or invalid credentials.
    #[error("{0}")]
    Auth(String),
    /// Unexpected persistence failure; the cause is appended.
    #[error("operation failed: {0}")]
    Database(#[from] sqlx::Error),
    /// Token signing failure.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl ApiError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a unique-constraint violation to the given conflict message,
    /// anything else to a database error.
    pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(message.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Auth("who".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_keeps_the_cause() {
        let err = ApiError::Database(sqlx::Error::RowNotFound);
        let message = err.to_string();
        assert!(message.starts_with("operation failed: "));
        assert!(message.len() > "operation failed: ".len());
    }
}
