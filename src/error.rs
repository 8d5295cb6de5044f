//! Client-facing error taxonomy for the user resource.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors returned to HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid user ID")]
    InvalidId,
    #[error("{0}")]
    InvalidField(String),
    #[error("User not found")]
    NotFound,
    #[error("Email already exists")]
    EmailExists,
    /// Any storage fault other than a uniqueness conflict
    #[error("{context}: {message}")]
    Storage { context: String, message: String },
}

impl ApiError {
    pub fn storage(context: &str, message: impl Into<String>) -> Self {
        ApiError::Storage {
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::InvalidField(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EmailExists => StatusCode::CONFLICT,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failure envelope for this error
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Storage { context, message } => ErrorBody {
                success: false,
                error: context.clone(),
                message: Some(message.clone()),
            },
            other => ErrorBody {
                success: false,
                error: other.to_string(),
                message: None,
            },
        }
    }
}

/// `{ success: false, error, message? }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
