use crate::domain::models::booking::BookingView;
use crate::domain::models::slot::Slot;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub court_id: String,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub outcome: &'static str,
    pub booking: Option<BookingView>,
}
