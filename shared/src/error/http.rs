//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidAuthHeader
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 500 Internal Server Error
            Self::Unknown
            | Self::LedgerWriteFailed
            | Self::LedgerReadFailed
            | Self::BookingNotFound
            | Self::AppointmentNotFound
            | Self::TransactionNotFound
            | Self::InternalError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField => StatusCode::BAD_REQUEST,
        }
    }
}
