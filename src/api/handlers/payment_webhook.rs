use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::PaymentWebhookRequest;
use crate::api::dtos::responses::WebhookResponse;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

const SETTLED_STATUSES: [&str; 4] = ["CONFIRMED", "RECEIVED", "PAYMENT_CONFIRMED", "PAYMENT_RECEIVED"];

/// Payment provider callback. Anything other than a settled payment is acknowledged and ignored.
pub async fn receive_payment_event(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PaymentWebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = payload.status.to_ascii_uppercase();
    if !SETTLED_STATUSES.contains(&status.as_str()) {
        info!(intent_id = %payload.intent_id, status = %status, "Ignoring payment event");
        return Ok(Json(WebhookResponse { outcome: "ignored", booking: None }));
    }

    let booking = state.booking_service.confirm_payment_by_reference(&payload.intent_id).await?;
    let view = state.booking_service.view(booking, state.clock.now());
    Ok(Json(WebhookResponse { outcome: "confirmed", booking: Some(view) }))
}
