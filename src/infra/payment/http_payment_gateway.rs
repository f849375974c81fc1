use crate::domain::models::booking::Booking;
use crate::domain::ports::{PaymentGateway, PaymentIntent};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Creates PIX-style payment intents on the external payment service.
pub struct HttpPaymentGateway {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("Could not build payment client: {}", e)))?;
        Ok(Self { client, api_url, api_key })
    }
}

#[derive(Serialize)]
struct IntentPayload<'a> {
    external_reference: &'a str,
    amount_cents: i64,
    description: String,
}

#[derive(Deserialize)]
struct IntentResponse {
    id: String,
    qr_code: String,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment_intent(&self, booking: &Booking, amount_cents: i64) -> Result<PaymentIntent, AppError> {
        let payload = IntentPayload {
            external_reference: &booking.id,
            amount_cents,
            description: format!(
                "Court booking {} {}-{}",
                booking.date, booking.start_time.format("%H:%M"), booking.end_time.format("%H:%M")
            ),
        };

        let res = self.client.post(format!("{}/payment-intents", self.api_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment service connection error: {}", e);
                error!("{}", msg);
                AppError::Gateway(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Payment service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Gateway(msg));
        }

        let body: IntentResponse = res.json().await
            .map_err(|e| AppError::Gateway(format!("Unreadable payment service response: {}", e)))?;

        info!(booking_id = %booking.id, intent_id = %body.id, amount_cents, "Payment intent created");
        Ok(PaymentIntent {
            intent_id: body.id,
            qr_payload: body.qr_code,
            expiry: body.expires_at,
        })
    }
}
