//! Shared types for the booking relay
//!
//! Wire DTOs exchanged with the Spring backend and the frontends,
//! Spring temporal normalization, and the unified error model.

pub mod booking;
pub mod datetime;
pub mod error;
pub mod util;

// Re-exports
pub use datetime::{TemporalError, TemporalValue, format_date, format_time};
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
