//! Booking service
//!
//! Sits between the HTTP handlers and the ledger: checks the few fields the
//! relay needs, reshapes Spring temporals, and turns ledger failures into
//! [`AppError`]s.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::booking::{
    AssignStaffRequest, BookingCreated, BookingRecord, CancelAppointmentRequest,
    CompleteAppointmentRequest, CreateBookingRequest, DEFAULT_STATUS, StaffUpdateRequest,
    StatusUpdateRequest, TxReceipt,
};
use shared::datetime::{format_optional_date, format_optional_time};
use shared::{AppError, AppResult, ErrorCode};

use crate::ledger::{Completion, Ledger, LedgerError, NewAppointment, NewBooking, StaffAssignment};

pub const MISSING_CREATE_FIELDS: &str =
    "Missing required fields: totalDoses and appointments are required";
pub const MISSING_STATUS: &str = "Status is required";
pub const MISSING_STAFF_NAME: &str = "staffName is required";
pub const MISSING_DOCTOR_NAME: &str = "doctorName is required";

#[derive(Clone)]
pub struct BookingService {
    ledger: Arc<dyn Ledger>,
}

impl BookingService {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger_name(&self) -> &'static str {
        self.ledger.name()
    }

    /// Validate and normalize a Spring booking, then record it on chain
    pub async fn create_booking(&self, request: CreateBookingRequest) -> AppResult<BookingCreated> {
        let booking = normalize_booking(request)?;
        let doses = booking.total_doses;

        let created = self
            .ledger
            .create_booking(booking)
            .await
            .map_err(|e| ledger_error(e, "Failed to create booking on blockchain", true))?;

        tracing::info!(
            blockchain_booking_id = created.blockchain_booking_id,
            tx = %created.transaction_hash,
            block = created.block_number,
            doses,
            "Booking recorded on chain"
        );
        Ok(created)
    }

    pub async fn list_bookings(&self) -> AppResult<Vec<BookingRecord>> {
        self.ledger
            .list_bookings()
            .await
            .map_err(|e| ledger_error(e, "Failed to fetch bookings from blockchain", false))
    }

    pub async fn get_booking(&self, blockchain_booking_id: u64) -> AppResult<BookingRecord> {
        self.ledger
            .get_booking(blockchain_booking_id)
            .await
            .map_err(|e| ledger_error(e, "Failed to fetch booking from blockchain", false))
    }

    pub async fn get_booking_by_transaction(&self, transaction_hash: &str) -> AppResult<BookingRecord> {
        let transaction_hash = transaction_hash.trim();
        if transaction_hash.is_empty() {
            return Err(AppError::required("transactionHash is required"));
        }
        self.ledger
            .get_booking_by_transaction(transaction_hash)
            .await
            .map_err(|e| ledger_error(e, "Failed to fetch booking by transaction", false))
    }

    pub async fn update_booking_status(
        &self,
        blockchain_booking_id: u64,
        request: StatusUpdateRequest,
    ) -> AppResult<TxReceipt> {
        let status = required_text(request.status, MISSING_STATUS)?;
        self.ledger
            .update_booking_status(blockchain_booking_id, &status)
            .await
            .map_err(|e| ledger_error(e, "Failed to update booking status on blockchain", true))
    }

    pub async fn update_appointment_status(
        &self,
        blockchain_appointment_id: u64,
        request: StatusUpdateRequest,
    ) -> AppResult<TxReceipt> {
        let status = required_text(request.status, MISSING_STATUS)?;
        self.ledger
            .update_appointment_status(blockchain_appointment_id, &status)
            .await
            .map_err(|e| {
                ledger_error(e, "Failed to update appointment status on blockchain", true)
            })
    }

    pub async fn update_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        request: StaffUpdateRequest,
    ) -> AppResult<TxReceipt> {
        let staff_name = required_text(request.staff_name, MISSING_STAFF_NAME)?;
        self.ledger
            .update_appointment_staff(blockchain_appointment_id, &staff_name)
            .await
            .map_err(|e| ledger_error(e, "Failed to update appointment staff on blockchain", true))
    }

    pub async fn assign_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        request: AssignStaffRequest,
    ) -> AppResult<TxReceipt> {
        let assignment = StaffAssignment {
            doctor_name: required_text(request.doctor_name, MISSING_DOCTOR_NAME)?,
            center_name: non_blank(request.center_name),
            scheduled_date: format_optional_date(request.scheduled_date.as_ref())
                .map_err(|e| AppError::invalid_format("Invalid scheduledDate").with_cause(e))?,
            scheduled_time: format_optional_time(request.scheduled_time.as_ref())
                .map_err(|e| AppError::invalid_format("Invalid scheduledTime").with_cause(e))?,
        };
        self.ledger
            .assign_appointment_staff(blockchain_appointment_id, assignment)
            .await
            .map_err(|e| ledger_error(e, "Failed to assign staff on blockchain", true))
    }

    pub async fn complete_appointment(
        &self,
        blockchain_appointment_id: u64,
        request: CompleteAppointmentRequest,
    ) -> AppResult<TxReceipt> {
        let completion = Completion {
            completed_by: non_blank(request.completed_by),
            completed_date: format_optional_date(request.completed_date.as_ref())
                .map_err(|e| AppError::invalid_format("Invalid completedDate").with_cause(e))?,
            notes: non_blank(request.notes),
        };
        self.ledger
            .complete_appointment(blockchain_appointment_id, completion)
            .await
            .map_err(|e| {
                ledger_error(e, "Failed to mark appointment completed on blockchain", true)
            })
    }

    pub async fn cancel_appointment(
        &self,
        blockchain_appointment_id: u64,
        request: CancelAppointmentRequest,
    ) -> AppResult<TxReceipt> {
        self.ledger
            .cancel_appointment(blockchain_appointment_id, non_blank(request.reason))
            .await
            .map_err(|e| {
                ledger_error(e, "Failed to mark appointment cancelled on blockchain", true)
            })
    }
}

/// Turn a Spring booking into the contract arguments
pub fn normalize_booking(request: CreateBookingRequest) -> AppResult<NewBooking> {
    let (Some(total_doses), Some(appointments)) = (request.total_doses, request.appointments) else {
        return Err(AppError::required(MISSING_CREATE_FIELDS));
    };
    if total_doses == 0 {
        return Err(AppError::required(MISSING_CREATE_FIELDS));
    }

    let appointments = appointments
        .into_iter()
        .enumerate()
        .map(|(index, appointment)| {
            let dose_number = appointment
                .dose_number
                .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX));

            let scheduled_date = format_optional_date(appointment.scheduled_date.as_ref())
                .map_err(|e| {
                    AppError::invalid_format(format!("Invalid scheduledDate for dose {dose_number}"))
                        .with_cause(e)
                })?;
            let scheduled_time = format_optional_time(appointment.scheduled_time.as_ref())
                .map_err(|e| {
                    AppError::invalid_format(format!("Invalid scheduledTime for dose {dose_number}"))
                        .with_cause(e)
                })?;

            Ok(NewAppointment {
                appointment_id: appointment.appointment_id,
                dose_number,
                scheduled_date,
                scheduled_time,
                center_name: non_blank(appointment.center_name),
                status: non_blank(appointment.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(NewBooking {
        booking_id: request.booking_id,
        patient_name: request.patient_name.unwrap_or_default(),
        family_member_name: non_blank(request.family_member_name),
        vaccine_name: request.vaccine_name.unwrap_or_default(),
        center_name: non_blank(request.center_name),
        total_doses,
        total_amount: request.total_amount.unwrap_or(Decimal::ZERO),
        payment_method: non_blank(request.payment_method),
        status: non_blank(request.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        appointments,
    })
}

fn required_text(value: Option<String>, message: &str) -> AppResult<String> {
    non_blank(value).ok_or_else(|| AppError::required(message))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Every ledger failure is a 500; missing entities keep their own code
fn ledger_error(err: LedgerError, message: &str, write: bool) -> AppError {
    let code = match &err {
        LedgerError::BookingNotFound(_) => ErrorCode::BookingNotFound,
        LedgerError::AppointmentNotFound(_) => ErrorCode::AppointmentNotFound,
        LedgerError::TransactionNotFound(_) => ErrorCode::TransactionNotFound,
        _ if write => ErrorCode::LedgerWriteFailed,
        _ => ErrorCode::LedgerReadFailed,
    };

    if err.is_not_found() {
        tracing::debug!(error = %err, "Ledger lookup missed");
        return AppError::new(code).with_cause(err);
    }

    tracing::error!(error = %err, "{message}");
    AppError::with_message(code, message).with_cause(err)
}
