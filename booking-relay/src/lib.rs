//! Booking relay
//!
//! Records vaccination bookings issued by the Spring backend on a ledger and
//! serves them back to the verification portal.
//!
//! ```text
//! booking-relay/src/
//! ├── api/        # HTTP routes and handlers
//! ├── auth/       # Bearer JWT verification
//! ├── ledger/     # Ledger trait, memory and gateway backends
//! ├── services/   # Validation, normalization, error mapping
//! ├── config.rs   # Environment configuration
//! ├── logger.rs   # tracing setup
//! └── state.rs    # Shared application state
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod ledger;
pub mod logger;
pub mod services;
pub mod state;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Security event on the `security` target (routed to its own log file)
#[macro_export]
macro_rules! security_log {
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: "security", event = $event, $($arg)*)
    };
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(target: "security", event = $event, $($arg)*)
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(target: "security", event = $event, $($arg)*)
    };
}
