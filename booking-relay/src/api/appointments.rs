//! Appointment mutation routes (all authenticated)
//!
//! PUT /api/bookings/appointments/{id}/{status|staff|assign-staff|completed|cancelled}

use axum::body::Bytes;
use axum::extract::{Path, State};
use shared::booking::{
    AssignStaffRequest, CancelAppointmentRequest, CompleteAppointmentRequest, StaffUpdateRequest,
    StatusUpdateRequest, TxReceipt,
};
use shared::{ApiResponse, AppResult};

use super::{parse_body, parse_id};
use crate::auth::AuthUser;
use crate::state::AppState;

fn recorded(
    user: &AuthUser,
    id: u64,
    action: &'static str,
    receipt: TxReceipt,
) -> ApiResponse<TxReceipt> {
    tracing::info!(
        actor = user.actor(),
        blockchain_appointment_id = id,
        tx = %receipt.transaction_hash,
        "{action}"
    );
    ApiResponse::success_with_message(format!("{action} on blockchain"), receipt)
}

pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse<TxReceipt>> {
    let id = parse_id(&id, "appointment id")?;
    let request: StatusUpdateRequest = parse_body(&body)?;
    let receipt = state.bookings().update_appointment_status(id, request).await?;
    Ok(recorded(&user, id, "Appointment status updated", receipt))
}

pub async fn update_staff(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse<TxReceipt>> {
    let id = parse_id(&id, "appointment id")?;
    let request: StaffUpdateRequest = parse_body(&body)?;
    let receipt = state.bookings().update_appointment_staff(id, request).await?;
    Ok(recorded(&user, id, "Appointment staff updated", receipt))
}

pub async fn assign_staff(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse<TxReceipt>> {
    let id = parse_id(&id, "appointment id")?;
    let request: AssignStaffRequest = parse_body(&body)?;
    let receipt = state.bookings().assign_appointment_staff(id, request).await?;
    Ok(recorded(&user, id, "Staff assigned", receipt))
}

pub async fn mark_completed(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse<TxReceipt>> {
    let id = parse_id(&id, "appointment id")?;
    let request: CompleteAppointmentRequest = parse_body(&body)?;
    let receipt = state.bookings().complete_appointment(id, request).await?;
    Ok(recorded(&user, id, "Appointment marked completed", receipt))
}

pub async fn mark_cancelled(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse<TxReceipt>> {
    let id = parse_id(&id, "appointment id")?;
    let request: CancelAppointmentRequest = parse_body(&body)?;
    let receipt = state.bookings().cancel_appointment(id, request).await?;
    Ok(recorded(&user, id, "Appointment marked cancelled", receipt))
}
