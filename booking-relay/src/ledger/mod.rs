//! Ledger backends
//!
//! The relay never talks to a chain node directly: every write is a named
//! contract function call. [`Ledger`] is the seam between the booking service
//! and whatever executes those calls.
//!
//! - [`MemoryLedger`]: in-process hash-chained ledger (development, tests)
//! - [`GatewayLedger`]: contract-call gateway over HTTP

pub mod gateway;
pub mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::booking::{BookingCreated, BookingRecord, TxReceipt};
use thiserror::Error;

pub use gateway::GatewayLedger;
pub use memory::MemoryLedger;

/// Contract function names
pub mod functions {
    pub const CREATE_BOOKING: &str = "createBooking";
    pub const GET_ALL_BOOKINGS: &str = "getAllBookings";
    pub const GET_BOOKING: &str = "getBooking";
    pub const GET_BOOKING_BY_TRANSACTION: &str = "getBookingByTransaction";
    pub const UPDATE_BOOKING_STATUS: &str = "updateBookingStatus";
    pub const UPDATE_APPOINTMENT_STATUS: &str = "updateAppointmentStatus";
    pub const UPDATE_APPOINTMENT_STAFF: &str = "updateAppointmentStaff";
    pub const ASSIGN_APPOINTMENT_STAFF: &str = "assignAppointmentStaff";
    pub const MARK_APPOINTMENT_COMPLETED: &str = "markAppointmentCompleted";
    pub const MARK_APPOINTMENT_CANCELLED: &str = "markAppointmentCancelled";
}

/// Booking after normalization, ready for `createBooking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub booking_id: Option<i64>,
    pub patient_name: String,
    pub family_member_name: Option<String>,
    pub vaccine_name: String,
    pub center_name: Option<String>,
    pub total_doses: u32,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub status: String,
    pub appointments: Vec<NewAppointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub appointment_id: Option<i64>,
    pub dose_number: u32,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub center_name: Option<String>,
    pub status: String,
}

/// Arguments of `assignAppointmentStaff`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub doctor_name: String,
    pub center_name: Option<String>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
}

/// Arguments of `markAppointmentCompleted`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub completed_by: Option<String>,
    pub completed_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("booking {0} not found on ledger")]
    BookingNotFound(u64),

    #[error("appointment {0} not found on ledger")]
    AppointmentNotFound(u64),

    #[error("transaction {0} not found on ledger")]
    TransactionNotFound(String),

    #[error("contract call {function} reverted: {reason}")]
    Reverted { function: String, reason: String },

    #[error("ledger gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ledger gateway returned {status}: {body}")]
    Gateway { status: u16, body: String },

    #[error("unexpected ledger response: {0}")]
    Decode(String),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BookingNotFound(_) | Self::AppointmentNotFound(_) | Self::TransactionNotFound(_)
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Contract operations the relay relies on
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Short backend name for logs and `/health`
    fn name(&self) -> &'static str;

    async fn create_booking(&self, booking: NewBooking) -> LedgerResult<BookingCreated>;

    async fn list_bookings(&self) -> LedgerResult<Vec<BookingRecord>>;

    async fn get_booking(&self, blockchain_booking_id: u64) -> LedgerResult<BookingRecord>;

    async fn get_booking_by_transaction(&self, transaction_hash: &str)
    -> LedgerResult<BookingRecord>;

    async fn update_booking_status(
        &self,
        blockchain_booking_id: u64,
        status: &str,
    ) -> LedgerResult<TxReceipt>;

    async fn update_appointment_status(
        &self,
        blockchain_appointment_id: u64,
        status: &str,
    ) -> LedgerResult<TxReceipt>;

    async fn update_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        staff_name: &str,
    ) -> LedgerResult<TxReceipt>;

    async fn assign_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        assignment: StaffAssignment,
    ) -> LedgerResult<TxReceipt>;

    async fn complete_appointment(
        &self,
        blockchain_appointment_id: u64,
        completion: Completion,
    ) -> LedgerResult<TxReceipt>;

    async fn cancel_appointment(
        &self,
        blockchain_appointment_id: u64,
        reason: Option<String>,
    ) -> LedgerResult<TxReceipt>;
}
