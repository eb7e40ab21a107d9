use crate::db::errors::DbError;
use crate::types::{Operation, Resource};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// User's role lacks the permission for the operation
    #[error("Insufficient permissions to {action} {resource:?}")]
    InsufficientPermissions { resource: Resource, action: Operation },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Request body or query string could not be parsed into the expected shape
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Requested resource not found. `message` overrides the generated text.
    #[error("{resource} {id} not found")]
    NotFound {
        resource: String,
        id: String,
        message: Option<String>,
    },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// Conflict error, e.g. a slug raced with another writer
    #[error("Conflict: {message}")]
    Conflict { message: String },
}

/// Error payload carried inside the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub details: Value,
}

impl Error {
    /// Shorthand for a public lookup miss with a fixed message, e.g. "Product Not Found".
    pub fn not_found_with_message(resource: &str, id: impl ToString, message: &str) -> Self {
        Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
            message: Some(message.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    /// Machine-readable error code placed in the envelope.
    pub fn code(&self) -> String {
        match self {
            Error::Validation { .. } => "VALIDATION_ERROR".to_string(),
            _ => format!("HTTP_{}", self.status_code().as_u16()),
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::InsufficientPermissions { action, resource } => {
                format!("Insufficient permissions to {action} {resource}")
            }
            Error::BadRequest { message } => message.clone(),
            Error::Validation { .. } => "Validation error".to_string(),
            Error::NotFound { resource, id, message } => message.clone().unwrap_or_else(|| format!("{resource} {id} not found")),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => match (table.as_deref(), constraint.as_deref()) {
                    (Some("users"), Some(c)) if c.contains("username") => "This username is already taken".to_string(),
                    (Some("categories"), Some(c)) if c.contains("name") => "A category with this name already exists".to_string(),
                    (_, Some(c)) if c.contains("slug") => "This slug is already in use".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
            Error::Conflict { message } => message.clone(),
        }
    }

    fn details(&self) -> Value {
        match self {
            Error::Validation { message } => serde_json::json!([{ "msg": message }]),
            Error::Database(DbError::UniqueViolation { constraint, table, .. }) => serde_json::json!({
                "table": table,
                "constraint": constraint,
            }),
            _ => serde_json::json!({}),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InsufficientPermissions { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Validation { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
        }

        let status = self.status_code();
        let body = serde_json::json!({
            "success": false,
            "data": null,
            "error": ErrorBody {
                code: self.code(),
                message: self.user_message(),
                details: self.details(),
            },
        });

        (status, Json(body)).into_response()
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_uses_custom_message() {
        let (status, body) = body_json(Error::not_found_with_message("Product", "missing", "Product Not Found")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["code"], "HTTP_404");
        assert_eq!(body["error"]["message"], "Product Not Found");
        assert_eq!(body["error"]["details"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_validation_error_is_422() {
        let (status, body) = body_json(Error::Validation {
            message: "missing field `name`".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Validation error");
        assert_eq!(body["error"]["details"][0]["msg"], "missing field `name`");
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak() {
        let (status, body) = body_json(Error::Other(anyhow::anyhow!("connection refused on 10.0.0.3"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "HTTP_500");
        assert_eq!(body["error"]["message"], "Internal server error");
    }

    #[test]
    fn test_slug_unique_violation_message() {
        let err = Error::Database(DbError::UniqueViolation {
            constraint: Some("products_slug_key".to_string()),
            table: Some("products".to_string()),
            message: "duplicate key".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "This slug is already in use");
    }
}
