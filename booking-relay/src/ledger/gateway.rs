//! Contract-call gateway client
//!
//! The gateway holds the signing wallet and the contract ABI; the relay only
//! names the function and passes JSON arguments.
//!
//! - `POST {base}/contract/invoke` `{function, args}` -> `{transactionHash, blockNumber, result}`
//! - `POST {base}/contract/query` `{function, args}` -> `{result}`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::booking::{BookingCreated, BookingRecord, OnChainAppointment, TxReceipt};

use super::{
    Completion, Ledger, LedgerError, LedgerResult, NewBooking, StaffAssignment, functions,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvokeResponse<T> {
    transaction_hash: String,
    block_number: u64,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Values emitted by `createBooking`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingResult {
    booking_id: u64,
    appointment_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct GatewayLedger {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GatewayLedger {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> LedgerResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn call(
        &self,
        path: &str,
        function: &str,
        args: Value,
        not_found: impl FnOnce() -> LedgerError,
    ) -> LedgerResult<Vec<u8>> {
        let mut request = self
            .client
            .post(format!("{}/contract/{path}", self.base_url))
            .json(&json!({ "function": function, "args": args }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok(body);
        }

        let text = String::from_utf8_lossy(&body).into_owned();
        tracing::warn!(function, status = status.as_u16(), body = %text, "Ledger gateway call failed");

        match status.as_u16() {
            404 => Err(not_found()),
            409 | 422 => {
                let reason = serde_json::from_slice::<Value>(&body)
                    .ok()
                    .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
                    .unwrap_or(text);
                Err(LedgerError::Reverted {
                    function: function.to_string(),
                    reason,
                })
            }
            code => Err(LedgerError::Gateway {
                status: code,
                body: text,
            }),
        }
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        function: &str,
        args: Value,
        not_found: impl FnOnce() -> LedgerError,
    ) -> LedgerResult<InvokeResponse<T>> {
        let body = self.call("invoke", function, args, not_found).await?;
        let response: InvokeResponse<T> = decode(&body)?;
        tracing::info!(
            function,
            tx = %response.transaction_hash,
            block = response.block_number,
            "Contract call mined"
        );
        Ok(response)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        function: &str,
        args: Value,
        not_found: impl FnOnce() -> LedgerError,
    ) -> LedgerResult<T> {
        let body = self.call("query", function, args, not_found).await?;
        let response: QueryResponse<T> = decode(&body)?;
        Ok(response.result)
    }

    async fn write_appointment(
        &self,
        function: &str,
        blockchain_appointment_id: u64,
        args: Value,
    ) -> LedgerResult<TxReceipt> {
        let response: InvokeResponse<Value> = self
            .invoke(function, args, || {
                LedgerError::AppointmentNotFound(blockchain_appointment_id)
            })
            .await?;
        Ok(TxReceipt {
            transaction_hash: response.transaction_hash,
            block_number: response.block_number,
        })
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> LedgerResult<T> {
    serde_json::from_slice(body).map_err(|e| LedgerError::Decode(e.to_string()))
}

/// 404 from a function that has no "missing entity" meaning
fn unexpected_404(function: &'static str) -> impl FnOnce() -> LedgerError {
    move || LedgerError::Gateway {
        status: 404,
        body: format!("{function} is not exposed by the gateway"),
    }
}

#[async_trait]
impl Ledger for GatewayLedger {
    fn name(&self) -> &'static str {
        "gateway"
    }

    async fn create_booking(&self, booking: NewBooking) -> LedgerResult<BookingCreated> {
        let args =
            serde_json::to_value(&booking).map_err(|e| LedgerError::Decode(e.to_string()))?;
        let response: InvokeResponse<CreateBookingResult> = self
            .invoke(
                functions::CREATE_BOOKING,
                args,
                unexpected_404(functions::CREATE_BOOKING),
            )
            .await?;

        let result = response
            .result
            .ok_or_else(|| LedgerError::Decode("createBooking returned no result".to_string()))?;
        if result.appointment_ids.len() != booking.appointments.len() {
            return Err(LedgerError::Decode(format!(
                "createBooking returned {} appointment ids for {} appointments",
                result.appointment_ids.len(),
                booking.appointments.len()
            )));
        }

        let on_chain_appointments = booking
            .appointments
            .into_iter()
            .zip(result.appointment_ids)
            .map(|(appointment, id)| OnChainAppointment {
                blockchain_appointment_id: id,
                appointment_id: appointment.appointment_id,
                dose_number: appointment.dose_number,
                scheduled_date: appointment.scheduled_date,
                scheduled_time: appointment.scheduled_time,
            })
            .collect();

        Ok(BookingCreated {
            blockchain_booking_id: result.booking_id,
            transaction_hash: response.transaction_hash,
            block_number: response.block_number,
            on_chain_appointments,
        })
    }

    async fn list_bookings(&self) -> LedgerResult<Vec<BookingRecord>> {
        self.query(
            functions::GET_ALL_BOOKINGS,
            json!({}),
            unexpected_404(functions::GET_ALL_BOOKINGS),
        )
        .await
    }

    async fn get_booking(&self, blockchain_booking_id: u64) -> LedgerResult<BookingRecord> {
        self.query(
            functions::GET_BOOKING,
            json!({ "bookingId": blockchain_booking_id }),
            || LedgerError::BookingNotFound(blockchain_booking_id),
        )
        .await
    }

    async fn get_booking_by_transaction(
        &self,
        transaction_hash: &str,
    ) -> LedgerResult<BookingRecord> {
        self.query(
            functions::GET_BOOKING_BY_TRANSACTION,
            json!({ "transactionHash": transaction_hash }),
            || LedgerError::TransactionNotFound(transaction_hash.to_string()),
        )
        .await
    }

    async fn update_booking_status(
        &self,
        blockchain_booking_id: u64,
        status: &str,
    ) -> LedgerResult<TxReceipt> {
        let response: InvokeResponse<Value> = self
            .invoke(
                functions::UPDATE_BOOKING_STATUS,
                json!({ "bookingId": blockchain_booking_id, "status": status }),
                || LedgerError::BookingNotFound(blockchain_booking_id),
            )
            .await?;
        Ok(TxReceipt {
            transaction_hash: response.transaction_hash,
            block_number: response.block_number,
        })
    }

    async fn update_appointment_status(
        &self,
        blockchain_appointment_id: u64,
        status: &str,
    ) -> LedgerResult<TxReceipt> {
        self.write_appointment(
            functions::UPDATE_APPOINTMENT_STATUS,
            blockchain_appointment_id,
            json!({ "appointmentId": blockchain_appointment_id, "status": status }),
        )
        .await
    }

    async fn update_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        staff_name: &str,
    ) -> LedgerResult<TxReceipt> {
        self.write_appointment(
            functions::UPDATE_APPOINTMENT_STAFF,
            blockchain_appointment_id,
            json!({ "appointmentId": blockchain_appointment_id, "staffName": staff_name }),
        )
        .await
    }

    async fn assign_appointment_staff(
        &self,
        blockchain_appointment_id: u64,
        assignment: StaffAssignment,
    ) -> LedgerResult<TxReceipt> {
        self.write_appointment(
            functions::ASSIGN_APPOINTMENT_STAFF,
            blockchain_appointment_id,
            json!({
                "appointmentId": blockchain_appointment_id,
                "doctorName": assignment.doctor_name,
                "centerName": assignment.center_name,
                "scheduledDate": assignment.scheduled_date,
                "scheduledTime": assignment.scheduled_time,
            }),
        )
        .await
    }

    async fn complete_appointment(
        &self,
        blockchain_appointment_id: u64,
        completion: Completion,
    ) -> LedgerResult<TxReceipt> {
        self.write_appointment(
            functions::MARK_APPOINTMENT_COMPLETED,
            blockchain_appointment_id,
            json!({
                "appointmentId": blockchain_appointment_id,
                "completedBy": completion.completed_by,
                "completedDate": completion.completed_date,
                "notes": completion.notes,
            }),
        )
        .await
    }

    async fn cancel_appointment(
        &self,
        blockchain_appointment_id: u64,
        reason: Option<String>,
    ) -> LedgerResult<TxReceipt> {
        self.write_appointment(
            functions::MARK_APPOINTMENT_CANCELLED,
            blockchain_appointment_id,
            json!({ "appointmentId": blockchain_appointment_id, "reason": reason }),
        )
        .await
    }
}
