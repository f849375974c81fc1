use crate::domain::ports::{Notifier, Recipient};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

/// Delivers push and SMS messages through the messaging service.
pub struct HttpNotifier {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotifier {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("Could not build messaging client: {}", e)))?;
        Ok(Self { client, api_url, api_key })
    }
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    recipient: &'a Recipient,
    body: &'a str,
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, recipient: &Recipient, message: &str) -> Result<(), AppError> {
        let payload = MessagePayload { recipient, body: message };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Messaging service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Messaging service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
