mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_court(app: &TestApp, upfront: bool) -> String {
    let (status, body) = app.request("POST", "/api/v1/courts", None, Some(json!({
        "arena_id": "arena-1",
        "name": "Quadra Central",
        "opens_at": "08:00",
        "closes_at": "22:00",
        "slot_duration_min": 60,
        "hourly_rate_cents": 9000,
        "requires_upfront_payment": upfront
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.router.clone().oneshot(
        Request::builder().uri("/health").body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_court_creation_validates_grid() {
    let app = TestApp::new().await;

    let (status, body) = app.request("POST", "/api/v1/courts", None, Some(json!({
        "arena_id": "arena-1",
        "name": "Quadra 2",
        "opens_at": "08:00",
        "closes_at": "22:00",
        "slot_duration_min": 45
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let (status, _) = app.request("POST", "/api/v1/courts", None, Some(json!({
        "arena_id": "arena-1",
        "name": "Quadra 2",
        "opens_at": "22:00",
        "closes_at": "08:00",
        "slot_duration_min": 60
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let app = TestApp::new().await;
    let court_id = create_court(&app, true).await;

    let (status, body) = app.request("GET", &format!("/api/v1/courts/{}/availability?date=2031-03-10", court_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"].as_array().unwrap().len(), 14);

    let (status, booking) = app.request("POST", "/api/v1/bookings", Some("athlete-a"), Some(json!({
        "court_id": court_id,
        "date": "2031-03-10",
        "slots": ["18:00", "19:00"],
        "sport": "BEACH_TENNIS"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "AGUARDANDO_PAGAMENTO");
    assert_eq!(booking["display_status"], "AGUARDANDO_PAGAMENTO");
    assert_eq!(booking["origin"], "ATLETA");
    assert_eq!(booking["athlete_id"], "athlete-a");
    assert_eq!(booking["payment_reference"], "pi_1");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // Two hours at R$ 90/h
    assert_eq!(app.payments.intents.lock().unwrap()[0].1, 18_000);

    let (status, body) = app.request("POST", "/api/v1/bookings", Some("athlete-b"), Some(json!({
        "court_id": court_id,
        "date": "2031-03-10",
        "slots": ["19:00"],
        "sport": "PADEL"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLOT_CONFLICT");

    let (_, body) = app.request("GET", &format!("/api/v1/courts/{}/availability?date=2031-03-10", court_id), None, None).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 12);

    let (status, body) = app.request("POST", "/api/v1/webhooks/payments", None, Some(json!({
        "intent_id": "pi_1",
        "status": "PENDING"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ignored");

    let (status, body) = app.request("POST", "/api/v1/webhooks/payments", None, Some(json!({
        "intent_id": "pi_1",
        "status": "payment_confirmed"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "confirmed");
    assert_eq!(body["booking"]["status"], "PENDENTE");

    let (status, body) = app.request("POST", &format!("/api/v1/bookings/{}/status", booking_id), None, Some(json!({
        "status": "PAGO"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PAGO");

    let (status, body) = app.request("GET", &format!("/api/v1/bookings/{}", booking_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_status"], "PAGO");
}

#[tokio::test]
async fn test_unknown_webhook_reference_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.request("POST", "/api/v1/webhooks/payments", None, Some(json!({
        "intent_id": "pi_unknown",
        "status": "RECEIVED"
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let app = TestApp::new().await;
    let court_id = create_court(&app, false).await;

    let (status, body) = app.request("POST", "/api/v1/bookings", Some("athlete-a"), Some(json!({
        "court_id": court_id,
        "date": "2031-03-10",
        "slots": ["25:00"],
        "sport": "FUTSAL"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let (status, body) = app.request("POST", "/api/v1/bookings", Some("athlete-a"), Some(json!({
        "court_id": court_id,
        "date": "2031-03-10",
        "slots": ["18:00", "20:00"],
        "sport": "FUTSAL"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SLOT_RANGE");

    let (status, _) = app.request("GET", "/api/v1/bookings/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_requests_need_an_athlete() {
    let app = TestApp::new().await;
    let court_id = create_court(&app, false).await;

    let (status, booking) = app.request("POST", "/api/v1/bookings", Some("owner"), Some(json!({
        "court_id": court_id,
        "date": "2031-03-10",
        "slots": ["18:00"],
        "sport": "VOLEI",
        "is_public": true,
        "players_needed": 2
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let booking_id = booking["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/bookings/{}/join-requests", booking_id);

    let (status, _) = app.request("POST", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, request) = app.request("POST", &uri, Some("athlete-b"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "PENDENTE");
    let request_id = request["id"].as_str().unwrap().to_string();

    let (status, body) = app.request("POST", &uri, Some("athlete-b"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_REQUEST");

    let resolve_uri = format!("/api/v1/join-requests/{}/resolve", request_id);
    let (status, _) = app.request("POST", &resolve_uri, Some("athlete-b"), Some(json!({ "accept": true }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.request("POST", &resolve_uri, Some("owner"), Some(json!({ "accept": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACEITO");

    let (status, body) = app.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_front_desk_booking_for_guest() {
    let app = TestApp::new().await;
    let court_id = create_court(&app, true).await;

    let (status, booking) = app.request("POST", "/api/v1/bookings", None, Some(json!({
        "court_id": court_id,
        "date": "2031-03-10",
        "slots": ["20:00"],
        "sport": "FUTEBOL",
        "guest_name": "Carlos",
        "guest_phone": "+5511988887777"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["origin"], "ARENA");
    assert_eq!(booking["status"], "PENDENTE");
    assert_eq!(booking["verification_code"], "123456");

    // Athlete origin without the header is refused
    let (status, _) = app.request("POST", "/api/v1/bookings", None, Some(json!({
        "court_id": court_id,
        "date": "2031-03-10",
        "slots": ["21:00"],
        "sport": "FUTEBOL",
        "origin": "ATLETA"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_bookings_with_filters() {
    let app = TestApp::new().await;
    let court_id = create_court(&app, false).await;

    for (athlete, slot) in [("athlete-a", "09:00"), ("athlete-a", "10:00"), ("athlete-b", "11:00")] {
        let (status, _) = app.request("POST", "/api/v1/bookings", Some(athlete), Some(json!({
            "court_id": court_id,
            "date": "2031-03-10",
            "slots": [slot],
            "sport": "TENIS"
        }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.request("GET", "/api/v1/bookings?athlete_id=athlete-a", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app.request("GET", &format!("/api/v1/bookings?court_id={}&status=PENDENTE", court_id), None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = app.request("GET", "/api/v1/bookings?status=PAGO", None, None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_series_endpoints() {
    let app = TestApp::new().await;
    let court_id = create_court(&app, false).await;

    let (status, _) = app.request("POST", "/api/v1/bookings", Some("athlete-b"), Some(json!({
        "court_id": court_id,
        "date": "2031-03-12",
        "slots": ["18:00"],
        "sport": "FUTSAL"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let series_payload = json!({
        "court_id": court_id,
        "weekday": 3,
        "start_time": "18:00",
        "sport": "FUTSAL",
        "period": "SEMANAL",
        "start_date": "2031-03-03",
        "end_date": "2031-03-30"
    });

    let (status, _) = app.request("POST", "/api/v1/series", None, Some(series_payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.request("POST", "/api/v1/series", Some("athlete-a"), Some(series_payload.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLOT_CONFLICT");

    let (status, body) = app.request("POST", "/api/v1/series?mode=skip_conflicts", Some("athlete-a"), Some(series_payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["bookings"].as_array().unwrap().len(), 3);
    assert_eq!(body["skipped_dates"], json!(["2031-03-12"]));
    let series_id = body["series"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.request("POST", &format!("/api/v1/series/{}/cancel", series_id), Some("athlete-b"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.request("POST", &format!("/api/v1/series/{}/cancel", series_id), Some("athlete-a"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["series"]["status"], "CANCELADO");

    let (status, body) = app.request("GET", &format!("/api/v1/series/{}", series_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["bookings"].as_array().unwrap().iter().all(|b| b["status"] == "CANCELADO"));
}
