//! Booking and appointment DTOs
//!
//! Request types mirror what the Spring backend posts (every field optional at
//! the wire level, so presence checks answer 400 instead of a decode failure).
//! Record types are the ledger read models served back to the frontends.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::datetime::TemporalValue;

/// Default status recorded on chain when Spring omits one
pub const DEFAULT_STATUS: &str = "PENDING";

// =============================================================================
// Requests
// =============================================================================

/// POST /api/bookings/create
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Spring booking id
    #[serde(default, alias = "id")]
    pub booking_id: Option<i64>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub family_member_name: Option<String>,
    #[serde(default)]
    pub vaccine_name: Option<String>,
    #[serde(default)]
    pub center_name: Option<String>,
    #[serde(default)]
    pub total_doses: Option<u32>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub appointments: Option<Vec<AppointmentInput>>,
}

/// One dose inside a create request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    /// Spring appointment id
    #[serde(default, alias = "id")]
    pub appointment_id: Option<i64>,
    #[serde(default)]
    pub dose_number: Option<u32>,
    #[serde(default)]
    pub scheduled_date: Option<TemporalValue>,
    #[serde(default)]
    pub scheduled_time: Option<TemporalValue>,
    #[serde(default)]
    pub center_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// PUT .../status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// PUT /api/bookings/appointments/{id}/staff
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUpdateRequest {
    #[serde(default)]
    pub staff_name: Option<String>,
}

/// PUT /api/bookings/appointments/{id}/assign-staff
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStaffRequest {
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub center_name: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<TemporalValue>,
    #[serde(default)]
    pub scheduled_time: Option<TemporalValue>,
}

/// PUT /api/bookings/appointments/{id}/completed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAppointmentRequest {
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub completed_date: Option<TemporalValue>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// PUT /api/bookings/appointments/{id}/cancelled
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Result of a successful `createBooking` contract call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub blockchain_booking_id: u64,
    pub transaction_hash: String,
    pub block_number: u64,
    pub on_chain_appointments: Vec<OnChainAppointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainAppointment {
    pub blockchain_appointment_id: u64,
    pub appointment_id: Option<i64>,
    pub dose_number: u32,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
}

/// Receipt of a mutating contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
}

/// Booking as recorded on chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub blockchain_booking_id: u64,
    pub booking_id: Option<i64>,
    pub patient_name: String,
    pub family_member_name: Option<String>,
    pub vaccine_name: String,
    pub center_name: Option<String>,
    pub total_doses: u32,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub status: String,
    /// Transaction that created the booking
    pub transaction_hash: String,
    pub block_number: u64,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
}

/// Appointment (one dose) as recorded on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub blockchain_appointment_id: u64,
    pub blockchain_booking_id: u64,
    pub appointment_id: Option<i64>,
    pub dose_number: u32,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub center_name: Option<String>,
    pub status: String,
    pub staff_name: Option<String>,
    pub doctor_name: Option<String>,
    pub completed_by: Option<String>,
    pub completed_date: Option<String>,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    pub updated_at: i64,
}
