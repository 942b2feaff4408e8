//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error with structured error code
///
/// `message` is what the operation was trying to do; `error` carries the
/// underlying cause (a ledger failure, a parse error) when there is one.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub error: Option<String>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            error: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            error: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_cause(mut self, cause: impl std::fmt::Display) -> Self {
        self.error = Some(cause.to_string());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn required(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::RequiredField, msg)
    }

    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidFormat, msg)
    }

    pub fn missing_auth_header() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_auth_header() -> Self {
        Self::new(ErrorCode::InvalidAuthHeader)
    }

    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::TokenInvalid)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn ledger_write(msg: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::with_message(ErrorCode::LedgerWriteFailed, msg).with_cause(cause)
    }

    pub fn ledger_read(msg: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::with_message(ErrorCode::LedgerReadFailed, msg).with_cause(cause)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

/// Unified API response structure
///
/// Success: `{ "success": true, "code": 0, "message": "...", "data": ... }`
/// Failure: `{ "success": false, "code": n, "message": "...", "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message("OK", data)
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            code: Some(0),
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            error: err.error.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            success: false,
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            error: err.error,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();

        if status.is_server_error() {
            tracing::error!(
                code = %self.code,
                category = self.code.category().name(),
                message = %self.message,
                cause = self.error.as_deref().unwrap_or("-"),
                "Request failed"
            );
        }

        let body = ApiResponse::<()>::from(self);
        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match self.code {
            None | Some(0) => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };

        (status, Json(self)).into_response()
    }
}
