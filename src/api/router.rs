use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, court, booking, join_request, series, payment_webhook};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Courts
        .route("/api/v1/courts", post(court::create_court))
        .route("/api/v1/courts/{court_id}/availability", get(court::get_availability))

        // Bookings
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_bookings))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/status", post(booking::mark_status))

        // Open games
        .route("/api/v1/bookings/{booking_id}/join-requests", post(join_request::request_to_join).get(join_request::list_join_requests))
        .route("/api/v1/join-requests/{request_id}/resolve", post(join_request::resolve_join_request))

        // Recurring series
        .route("/api/v1/series", post(series::create_series))
        .route("/api/v1/series/{series_id}", get(series::get_series))
        .route("/api/v1/series/{series_id}/cancel", post(series::cancel_series))

        // Payment provider
        .route("/api/v1/webhooks/payments", post(payment_webhook::receive_payment_event))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        athlete_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
