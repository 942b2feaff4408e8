//! Booking routes
//!
//! - POST /api/bookings/create
//! - GET  /api/bookings
//! - GET  /api/bookings/{id}
//! - GET  /api/bookings/tx/{transaction_hash}
//! - PUT  /api/bookings/{id}/status

use axum::body::Bytes;
use axum::extract::{Path, State};
use http::StatusCode;
use shared::booking::{
    BookingCreated, BookingRecord, CreateBookingRequest, StatusUpdateRequest, TxReceipt,
};
use shared::{ApiResponse, AppResult};

use super::{parse_body, parse_id};
use crate::auth::AuthUser;
use crate::state::AppState;

pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> AppResult<(StatusCode, ApiResponse<BookingCreated>)> {
    let request: CreateBookingRequest = parse_body(&body)?;
    tracing::info!(
        actor = user.actor(),
        booking_id = ?request.booking_id,
        "Recording booking"
    );

    let created = state.bookings().create_booking(request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Booking recorded on blockchain", created),
    ))
}

pub async fn list_bookings(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BookingRecord>>> {
    let bookings = state.bookings().list_bookings().await?;
    Ok(ApiResponse::success_with_message(
        format!("Found {} bookings", bookings.len()),
        bookings,
    ))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookingRecord>> {
    let id = parse_id(&id, "booking id")?;
    let booking = state.bookings().get_booking(id).await?;
    Ok(ApiResponse::success_with_message("Booking found", booking))
}

pub async fn get_booking_by_transaction(
    State(state): State<AppState>,
    Path(transaction_hash): Path<String>,
) -> AppResult<ApiResponse<BookingRecord>> {
    let booking = state
        .bookings()
        .get_booking_by_transaction(&transaction_hash)
        .await?;
    Ok(ApiResponse::success_with_message("Booking found", booking))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse<TxReceipt>> {
    let id = parse_id(&id, "booking id")?;
    let request: StatusUpdateRequest = parse_body(&body)?;

    let receipt = state.bookings().update_booking_status(id, request).await?;
    tracing::info!(actor = user.actor(), blockchain_booking_id = id, tx = %receipt.transaction_hash, "Booking status updated");
    Ok(ApiResponse::success_with_message(
        "Booking status updated on blockchain",
        receipt,
    ))
}
