//! In-process ledger
//!
//! Behaves like the booking contract: sequential on-chain ids, one block per
//! write, and transaction hashes chained with SHA-256 over
//! `previous hash ‖ function ‖ canonical JSON args ‖ block number`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use shared::booking::{
    AppointmentRecord, BookingCreated, BookingRecord, OnChainAppointment, TxReceipt,
};
use shared::util::now_millis;

use super::{
    Completion, Ledger, LedgerError, LedgerResult, NewBooking, StaffAssignment, functions,
};

pub const STATUS_SCHEDULED: &str = "SCHEDULED";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

#[derive(Default)]
struct Chain {
    bookings: BTreeMap<u64, BookingRecord>,
    appointments: BTreeMap<u64, AppointmentRecord>,
    /// booking -> its appointment ids, in creation order
    appointments_by_booking: HashMap<u64, Vec<u64>>,
    /// lowercase tx hash -> booking touched by that transaction
    tx_index: HashMap<String, u64>,
    next_booking_id: u64,
    next_appointment_id: u64,
    block_number: u64,
    last_hash: [u8; 32],
}

impl Chain {
    /// Seal one transaction into a new block
    fn commit(&mut self, function: &str, args: &Value, booking_id: u64) -> TxReceipt {
        self.block_number += 1;

        let mut hasher = Sha256::new();
        hasher.update(self.last_hash);
        hasher.update(function.as_bytes());
        hasher.update(args.to_string().as_bytes());
        hasher.update(self.block_number.to_be_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        self.last_hash = digest;

        let transaction_hash = format!("0x{}", hex::encode(digest));
        self.tx_index.insert(transaction_hash.clone(), booking_id);

        TxReceipt {
            transaction_hash,
            block_number: self.block_number,
        }
    }

    fn assemble(&self, booking_id: u64) -> Option<BookingRecord> {
        let mut booking = self.bookings.get(&booking_id)?.clone();
        booking.appointments = self
            .appointments_by_booking
            .get(&booking_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.appointments.get(id))
            .cloned()
            .collect();
        Some(booking)
    }

    /// Apply `change` to an appointment and record the transaction
    fn mutate_appointment<F>(
        &mut self,
        function: &str,
        args: Value,
        appointment_id: u64,
        change: F,
    ) -> LedgerResult<TxReceipt>
    where
        F: FnOnce(&mut AppointmentRecord),
    {
        let now = now_millis();
        let appointment = self
            .appointments
            .get_mut(&appointment_id)
            .ok_or(LedgerError::AppointmentNotFound(appointment_id))?;
        change(appointment);
        appointment.updated_at = now;

        let booking_id = appointment.blockchain_booking_id;
        if let Some(booking) = self.bookings.get_mut(&booking_id) {
            booking.updated_at = now;
        }

        Ok(self.commit(function, &args, booking_id))
    }
}

/// Hash-chained ledger held in memory
#[derive(Default)]
pub struct MemoryLedger {
    chain: RwLock<Chain>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height of the latest block
    pub fn block_number(&self) -> u64 {
        self.chain.read().block_number
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_booking(&self, booking: NewBooking) -> LedgerResult<BookingCreated> {
        let args =
            serde_json::to_value(&booking).map_err(|e| LedgerError::Decode(e.to_string()))?;
        let now = now_millis();

        let mut chain = self.chain.write();
        chain.next_booking_id += 1;
        let booking_id = chain.next_booking_id;

        let mut on_chain_appointments = Vec::with_capacity(booking.appointments.len());
        let mut appointment_ids = Vec::with_capacity(booking.appointments.len());
        for appointment in booking.appointments {
            chain.next_appointment_id += 1;
            let appointment_id = chain.next_appointment_id;
            appointment_ids.push(appointment_id);

            on_chain_appointments.push(OnChainAppointment {
                blockchain_appointment_id: appointment_id,
                appointment_id: appointment.appointment_id,
                dose_number: appointment.dose_number,
                scheduled_date: appointment.scheduled_date.clone(),
                scheduled_time: appointment.scheduled_time.clone(),
            });

            chain.appointments.insert(
                appointment_id,
                AppointmentRecord {
                    blockchain_appointment_id: appointment_id,
                    blockchain_booking_id: booking_id,
                    appointment_id: appointment.appointment_id,
                    dose_number: appointment.dose_number,
                    scheduled_date: appointment.scheduled_date,
                    scheduled_time: appointment.scheduled_time,
                    center_name: appointment.center_name,
                    status: appointment.status,
                    staff_name: None,
                    doctor_name: None,
                    completed_by: None,
                    completed_date: None,
                    notes: None,
                    cancel_reason: None,
                    updated_at: now,
                },
            );
        }

        chain.appointments_by_booking.insert(booking_id, appointment_ids);
        let receipt = chain.commit(functions::CREATE_BOOKING, &args, booking_id);

        chain.bookings.insert(
            booking_id,
            BookingRecord {
                blockchain_booking_id: booking_id,
                booking_id: booking.booking_id,
                patient_name: booking.patient_name,
                family_member_name: booking.family_member_name,
                vaccine_name: booking.vaccine_name,
                center_name: booking.center_name,
                total_doses: booking.total_doses,
                total_amount: booking.total_amount,
                payment_method: booking.payment_method,
                status: booking.status,
                transaction_hash: receipt.transaction_hash.clone(),
                block_number: receipt.block_number,
                created_at: now,
                updated_at: now,
                appointments: Vec::new(),
            },
        );

        Ok(BookingCreated {
            blockchain_booking_id: booking_id,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            on_chain_appointments,
        })
    }

    async fn list_bookings(&self) -> LedgerResult<Vec<BookingRecord>> {
        let chain = self.chain.read();
        Ok(chain
            .bookings
            .keys()
            .filter_map(|id| chain.assemble(*id))
            .collect())
    }

    async fn get_booking(&self, blockchain_booking_id: u64) -> LedgerResult<BookingRecord> {
        self.chain
            .read()
            .assemble(blockchain_booking_id)
            .ok_or(LedgerError::BookingNotFound(blockchain_booking_id))
    }

    async fn get_booking_by_transaction(
        &self,
        transaction_hash: &str,
    ) -> LedgerResult<BookingRecord> {
        let chain = self.chain.read();
        chain
            .tx_index
            .get(&transaction_hash.to_ascii_lowercase())
            .and_then(|id| chain.assemble(*id))
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_hash.to_string()))
    }

    async fn update_booking_status(
        &self,
        blockchain_booking_id: u64,
        status: &str,
    ) -> LedgerResult<TxReceipt> {
        let mut chain = self.chain.write();
        let booking = chain
            .bookings
            .get_mut(&blockchain_booking_id)
            .ok_or(LedgerError::BookingNotFound(blockchain_booking_id))?;
        booking.status = status.to_string();
        booking.updated_at = now_millis();

        let args = json!({ "bookingId": blockchain_booking_id, "status": status });
        Ok(chain.commit(
            functions::UPDATE_BOOKING_STATUS,
            &args,
            blockchain_booking_id,
        ))
    }

    async fn update_appointment_status(
        &self,
        blockchain_appointment_id: u64,
        status: &str,
    ) -> LedgerResult<TxReceipt> {
        let args = json!({ "appointmentId": blockchain_appointment_id, "status": status });
        self.chain.write().mutate_appointment(
            functions::UPDATE_APPOINTMENT_STATUS,
            args,
            blockchain_appointment_id,
            |a| a.status = status.to_string(),
        )
    }

    async fn update_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        staff_name: &str,
    ) -> LedgerResult<TxReceipt> {
        let args = json!({ "appointmentId": blockchain_appointment_id, "staffName": staff_name });
        self.chain.write().mutate_appointment(
            functions::UPDATE_APPOINTMENT_STAFF,
            args,
            blockchain_appointment_id,
            |a| a.staff_name = Some(staff_name.to_string()),
        )
    }

    async fn assign_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        assignment: StaffAssignment,
    ) -> LedgerResult<TxReceipt> {
        let args = json!({ "appointmentId": blockchain_appointment_id, "assignment": assignment });
        self.chain.write().mutate_appointment(
            functions::ASSIGN_APPOINTMENT_STAFF,
            args,
            blockchain_appointment_id,
            |a| {
                a.doctor_name = Some(assignment.doctor_name);
                if assignment.center_name.is_some() {
                    a.center_name = assignment.center_name;
                }
                if assignment.scheduled_date.is_some() {
                    a.scheduled_date = assignment.scheduled_date;
                }
                if assignment.scheduled_time.is_some() {
                    a.scheduled_time = assignment.scheduled_time;
                }
                a.status = STATUS_SCHEDULED.to_string();
            },
        )
    }

    async fn complete_appointment(
        &self,
        blockchain_appointment_id: u64,
        completion: Completion,
    ) -> LedgerResult<TxReceipt> {
        let args = json!({ "appointmentId": blockchain_appointment_id, "completion": completion });
        self.chain.write().mutate_appointment(
            functions::MARK_APPOINTMENT_COMPLETED,
            args,
            blockchain_appointment_id,
            |a| {
                a.status = STATUS_COMPLETED.to_string();
                a.completed_by = completion.completed_by;
                a.completed_date = completion.completed_date;
                a.notes = completion.notes;
            },
        )
    }

    async fn cancel_appointment(
        &self,
        blockchain_appointment_id: u64,
        reason: Option<String>,
    ) -> LedgerResult<TxReceipt> {
        let args = json!({ "appointmentId": blockchain_appointment_id, "reason": reason });
        self.chain.write().mutate_appointment(
            functions::MARK_APPOINTMENT_CANCELLED,
            args,
            blockchain_appointment_id,
            |a| {
                a.status = STATUS_CANCELLED.to_string();
                a.cancel_reason = reason;
            },
        )
    }
}
