//! API routes for the booking relay

pub mod appointments;
pub mod bookings;
pub mod health;

use axum::body::Bytes;
use axum::routing::{get, post, put};
use axum::{Router, middleware};
use serde::de::DeserializeOwned;
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::require_auth;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Ledger writes (always authenticated)
    let writes = Router::new()
        .route("/api/bookings/create", post(bookings::create_booking))
        .route("/api/bookings/{id}/status", put(bookings::update_booking_status))
        .route(
            "/api/bookings/appointments/{id}/status",
            put(appointments::update_status),
        )
        .route(
            "/api/bookings/appointments/{id}/staff",
            put(appointments::update_staff),
        )
        .route(
            "/api/bookings/appointments/{id}/assign-staff",
            put(appointments::assign_staff),
        )
        .route(
            "/api/bookings/appointments/{id}/completed",
            put(appointments::mark_completed),
        )
        .route(
            "/api/bookings/appointments/{id}/cancelled",
            put(appointments::mark_cancelled),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Read-throughs (public unless REQUIRE_AUTH_FOR_READS)
    let mut reads = Router::new()
        .route("/api/bookings", get(bookings::list_bookings))
        .route(
            "/api/bookings/tx/{transaction_hash}",
            get(bookings::get_booking_by_transaction),
        )
        .route("/api/bookings/{id}", get(bookings::get_booking));
    if state.require_auth_for_reads {
        reads = reads.route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
    }

    Router::new()
        .route("/health", get(health::health_check))
        .merge(writes)
        .merge(reads)
        .with_state(state)
}

/// Parse a JSON body; an empty body reads as the all-defaults request
pub(crate) fn parse_body<T>(body: &Bytes) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::with_message(ErrorCode::InvalidRequest, "Invalid JSON body").with_cause(e)
    })
}

/// Parse a ledger id taken from the path
pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_format(format!("Invalid {what}: {raw}")))
}
