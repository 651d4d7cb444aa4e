use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::services::{AuthError, CatalogError, MetadataError, UserContentError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    /// `existing` is echoed back as `item` when present
    Conflict {
        message: String,
        existing: Option<Value>,
    },

    Unauthorized(String),

    Forbidden(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    InternalError(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item: Option<Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict { message, .. } => write!(f, "Conflict: {message}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => write!(f, "{service} error: {message}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let plain = |status: StatusCode, message: String| {
            (
                status,
                ErrorBody {
                    message,
                    error: None,
                    item: None,
                },
            )
        };

        let (status, body) = match self {
            Self::NotFound(msg) => plain(StatusCode::NOT_FOUND, msg),
            Self::ValidationError(msg) => plain(StatusCode::BAD_REQUEST, msg),
            Self::Conflict { message, existing } => (
                StatusCode::CONFLICT,
                ErrorBody {
                    message,
                    error: None,
                    item: existing,
                },
            ),
            Self::Unauthorized(msg) => plain(StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => plain(StatusCode::FORBIDDEN, msg),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "A database error occurred".to_string(),
                        error: Some(msg),
                        item: None,
                    },
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: format!("{service} request failed"),
                        error: Some(message),
                        item: None,
                    },
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "An internal error occurred".to_string(),
                        error: Some(msg),
                        item: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(msg) => Self::NotFound(msg),
            CatalogError::Validation(msg) => Self::ValidationError(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
            CatalogError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<UserContentError> for ApiError {
    fn from(err: UserContentError) -> Self {
        match err {
            UserContentError::Validation(msg) => Self::ValidationError(msg),
            UserContentError::NotFound(msg) => Self::NotFound(msg),
            UserContentError::Conflict { message, existing } => Self::Conflict { message, existing },
            UserContentError::Database(msg) => Self::DatabaseError(msg),
            UserContentError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::NotFound(msg) => Self::NotFound(msg),
            MetadataError::InvalidArgument(msg) => Self::ValidationError(msg),
            MetadataError::Provider(message) => Self::tmdb_error(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::EmailTaken => Self::conflict("Email already exists"),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict {
            message: msg.into(),
            existing: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Authentication required".to_string())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("Admin privileges required".to_string())
    }

    pub fn tmdb_error(msg: impl Into<String>) -> Self {
        Self::ExternalApiError {
            service: "TMDB".to_string(),
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_error_carries_cause() {
        let (status, body) = body_of(ApiError::internal("disk full")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal error occurred");
        assert_eq!(body["error"], "disk full");
    }

    #[tokio::test]
    async fn test_conflict_echoes_existing_item() {
        let err = ApiError::from(UserContentError::Conflict {
            message: "Item already in watchlist".to_string(),
            existing: Some(serde_json::json!({"id": 4})),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["item"]["id"], 4);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (ApiError::validation("bad"), StatusCode::BAD_REQUEST),
            (ApiError::unauthorized(), StatusCode::UNAUTHORIZED),
            (ApiError::forbidden(), StatusCode::FORBIDDEN),
            (
                ApiError::from(MetadataError::NotFound("Movie not found".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(MetadataError::Provider("500 - boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(AuthError::EmailTaken),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
