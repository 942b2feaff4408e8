//! Router tests: the real router driven in-process with `oneshot`

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use jsonwebtoken::Algorithm;
use serde_json::{Value, json};
use tower::ServiceExt;

use booking_relay::auth::{JwtVerifier, create_token};
use booking_relay::ledger::MemoryLedger;
use booking_relay::{AppState, create_router};

const SECRET: &str = "relay-integration-test-secret-0123456789";

fn app(require_auth_for_reads: bool) -> Router {
    let verifier = JwtVerifier::new(SECRET, false, 0).unwrap();
    let state = AppState::from_parts(verifier, Arc::new(MemoryLedger::new()), require_auth_for_reads);
    create_router(state)
}

fn token(exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    create_token(
        &json!({ "sub": "staff@clinic.vn", "iat": now, "exp": now + exp_offset }),
        SECRET.as_bytes(),
        Algorithm::HS384,
    )
    .unwrap()
}

fn bearer() -> String {
    format!("Bearer {}", token(3600))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn booking_body() -> Value {
    json!({
        "id": 77,
        "patientName": "Nguyen Van A",
        "vaccineName": "Hepatitis B",
        "centerName": "District 1 Center",
        "totalDoses": 2,
        "totalAmount": 450000.0,
        "paymentMethod": "VNPAY",
        "appointments": [
            { "id": 901, "scheduledDate": [2025, 11, 20], "scheduledTime": [9, 5, 0] },
            { "id": 902, "doseNumber": 2, "scheduledDate": "2025-12-20", "scheduledTime": [14, 30] }
        ]
    })
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(true), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ledger"], "memory");
}

#[tokio::test]
async fn writes_without_header_are_rejected() {
    let (status, body) = send(
        &app(false),
        "POST",
        "/api/bookings/create",
        None,
        Some(booking_body()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing Authorization header");
}

#[tokio::test]
async fn malformed_header_is_rejected() {
    let app = app(false);
    for header in ["Token abc", "Bearer", "Bearer a b", "Bearer  abc", "Bearer\tabc"] {
        let (status, body) = send(
            &app,
            "PUT",
            "/api/bookings/1/status",
            Some(header),
            Some(json!({ "status": "CONFIRMED" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
        assert_eq!(body["message"], "Invalid Authorization header format");
    }
}

#[tokio::test]
async fn bad_or_expired_token_is_rejected() {
    let app = app(false);
    let expired = format!("Bearer {}", token(-600));
    for header in [expired.as_str(), "Bearer not.a.jwt"] {
        let (status, body) = send(
            &app,
            "PUT",
            "/api/bookings/appointments/1/cancelled",
            Some(header),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired token");
        assert!(body["error"].is_string(), "cause missing for {header:?}");
    }
}

#[tokio::test]
async fn token_without_exp_is_accepted() {
    let app = app(false);
    let token = create_token(
        &json!({ "sub": "staff@clinic.vn" }),
        SECRET.as_bytes(),
        Algorithm::HS256,
    )
    .unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/bookings/1/status",
        Some(&format!("Bearer {token}")),
        Some(json!({})),
    )
    .await;
    // past auth: the handler's own validation answers
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Status is required");
}

#[tokio::test]
async fn create_requires_total_doses_and_appointments() {
    let app = app(false);
    let auth = bearer();

    let mut without_doses = booking_body();
    without_doses.as_object_mut().unwrap().remove("totalDoses");
    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings/create",
        Some(&auth),
        Some(without_doses),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Missing required fields: totalDoses and appointments are required"
    );

    let mut without_appointments = booking_body();
    without_appointments.as_object_mut().unwrap().remove("appointments");
    let (status, _) = send(
        &app,
        "POST",
        "/api/bookings/create",
        Some(&auth),
        Some(without_appointments),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app(false);
    let request = Request::builder()
        .method("POST")
        .uri("/api/bookings/create")
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"totalDoses\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Invalid JSON body");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn booking_lifecycle() {
    let app = app(false);
    let auth = bearer();

    let (status, created) = send(
        &app,
        "POST",
        "/api/bookings/create",
        Some(&auth),
        Some(booking_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);

    let data = &created["data"];
    let booking_id = data["blockchainBookingId"].as_u64().unwrap();
    let tx = data["transactionHash"].as_str().unwrap().to_string();
    assert!(tx.starts_with("0x"));

    let appointments = data["onChainAppointments"].as_array().unwrap();
    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0]["doseNumber"], 1);
    assert_eq!(appointments[0]["scheduledDate"], "2025-11-20");
    assert_eq!(appointments[0]["scheduledTime"], "09:05:00");
    assert_eq!(appointments[1]["scheduledTime"], "14:30:00");
    let appointment_id = appointments[1]["blockchainAppointmentId"].as_u64().unwrap();

    // public reads
    let (status, fetched) = send(&app, "GET", &format!("/api/bookings/{booking_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["patientName"], "Nguyen Van A");
    assert_eq!(fetched["data"]["status"], "PENDING");

    let (status, by_tx) = send(&app, "GET", &format!("/api/bookings/tx/{tx}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_tx["data"]["blockchainBookingId"], booking_id);

    let (status, all) = send(&app, "GET", "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["data"].as_array().unwrap().len(), 1);

    // mutations
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/bookings/{booking_id}/status"),
        Some(&auth),
        Some(json!({ "status": "CONFIRMED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["data"]["transactionHash"].is_string());

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/bookings/appointments/{appointment_id}/assign-staff"),
        Some(&auth),
        Some(json!({ "doctorName": "Dr. Tran", "scheduledDate": [2025, 12, 22] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/bookings/appointments/{appointment_id}/staff"),
        Some(&auth),
        Some(json!({ "staffName": "Nurse Le" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/bookings/appointments/{appointment_id}/completed"),
        Some(&auth),
        Some(json!({ "completedBy": "Nurse Le", "completedDate": [2025, 12, 22] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = send(&app, "GET", &format!("/api/bookings/{booking_id}"), None, None).await;
    assert_eq!(fetched["data"]["status"], "CONFIRMED");
    let second = &fetched["data"]["appointments"][1];
    assert_eq!(second["doctorName"], "Dr. Tran");
    assert_eq!(second["staffName"], "Nurse Le");
    assert_eq!(second["scheduledDate"], "2025-12-22");
    assert_eq!(second["completedDate"], "2025-12-22");
    assert_eq!(second["status"], "COMPLETED");
}

#[tokio::test]
async fn missing_status_is_a_bad_request() {
    let app = app(false);
    let auth = bearer();
    let (status, body) = send(
        &app,
        "PUT",
        "/api/bookings/appointments/1/status",
        Some(&auth),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Status is required");
}

#[tokio::test]
async fn unknown_entities_are_server_errors() {
    let app = app(false);
    let auth = bearer();

    let (status, body) = send(&app, "GET", "/api/bookings/99", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 5101);
    assert_eq!(body["message"], "Booking not found");
    assert_eq!(body["error"], "booking 99 not found on ledger");

    let (status, body) = send(&app, "GET", "/api/bookings/tx/0xdeadbeef", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 5103);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/bookings/appointments/42/cancelled",
        Some(&auth),
        Some(json!({ "reason": "patient request" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 5102);
}

#[tokio::test]
async fn bad_path_id_is_a_bad_request() {
    let (status, body) = send(&app(false), "GET", "/api/bookings/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid booking id: abc");
}

#[tokio::test]
async fn reads_can_require_auth() {
    let app = app(true);

    let (status, body) = send(&app, "GET", "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Authorization header");

    let (status, body) = send(&app, "GET", "/api/bookings", Some(&bearer()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}
