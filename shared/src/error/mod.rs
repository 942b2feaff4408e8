//! Unified error system for the booking relay
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`ErrorCategory`]: Classification of errors by code range
//! - [`AppError`]: Error type carrying code, message and underlying cause
//! - [`ApiResponse`]: Response envelope shared by every endpoint
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 5xxx: Ledger errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::validation("Status is required");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//!
//! let err = AppError::ledger_write("Failed to update booking status", "gateway timeout");
//! let response = ApiResponse::<()>::error(&err);
//! assert!(!response.success);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
