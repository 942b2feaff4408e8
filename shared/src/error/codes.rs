//! Error codes for the booking relay

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a `u16` so the admin frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format (dates, times, ids)
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// No Authorization header
    NotAuthenticated = 1001,
    /// Authorization header is not `Bearer <token>`
    InvalidAuthHeader = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 5xxx: Ledger ====================
    /// A contract write failed
    LedgerWriteFailed = 5001,
    /// A contract read failed
    LedgerReadFailed = 5002,
    /// Booking does not exist on chain
    BookingNotFound = 5101,
    /// Appointment does not exist on chain
    AppointmentNotFound = 5102,
    /// Transaction hash is unknown to the ledger
    TransactionNotFound = 5103,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            ErrorCode::NotAuthenticated => "Missing Authorization header",
            ErrorCode::InvalidAuthHeader => "Invalid Authorization header format",
            ErrorCode::TokenExpired => "Invalid or expired token",
            ErrorCode::TokenInvalid => "Invalid or expired token",

            ErrorCode::LedgerWriteFailed => "Blockchain write failed",
            ErrorCode::LedgerReadFailed => "Blockchain read failed",
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::AppointmentNotFound => "Appointment not found",
            ErrorCode::TransactionNotFound => "Transaction not found",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidAuthHeader),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            5001 => Ok(ErrorCode::LedgerWriteFailed),
            5002 => Ok(ErrorCode::LedgerReadFailed),
            5101 => Ok(ErrorCode::BookingNotFound),
            5102 => Ok(ErrorCode::AppointmentNotFound),
            5103 => Ok(ErrorCode::TransactionNotFound),

            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
