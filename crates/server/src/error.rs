//! Application error handling

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scribe_core::{CoreError, ErrorCode, ErrorResponse};
use scribe_extract::ExtractError;

use crate::ai::ClaudeError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Not authorized")]
    NotAuthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::not_authenticated())
            }
            AppError::NotAuthorized => (StatusCode::FORBIDDEN, ErrorResponse::not_authorized()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::invalid(&msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::conflict(&msg)),
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new(ErrorCode::Upstream, msg),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(ErrorCode::Exception, msg),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated => AppError::NotAuthenticated,
            CoreError::NotAuthorized => AppError::NotAuthorized,
            CoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            CoreError::Invalid(msg) => AppError::BadRequest(msg),
            CoreError::InvalidTransition { .. } | CoreError::NotEditable(_) => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<ClaudeError> for AppError {
    fn from(err: ClaudeError) -> Self {
        match err {
            ClaudeError::Http(_) | ClaudeError::Api { .. } => AppError::Upstream(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Stored document is malformed: {}", err))
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        AppError::Internal(format!("Database pool error: {}", err))
    }
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        AppError::Internal(format!("Database error: {}", err))
    }
}
