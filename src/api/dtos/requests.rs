use crate::domain::models::booking::{BookingOrigin, BookingStatus, SportType};
use crate::domain::models::series::{ConflictMode, RecurrencePeriod};
use crate::error::AppError;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date format (YYYY-MM-DD): {}", value)))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time format (HH:MM): {}", value)))
}

#[derive(Deserialize)]
pub struct CreateCourtRequest {
    pub arena_id: String,
    pub name: String,
    pub opens_at: String,
    pub closes_at: String,
    pub slot_duration_min: i32,
    pub hourly_rate_cents: Option<i64>,
    pub requires_upfront_payment: Option<bool>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub court_id: String,
    pub date: String,
    pub slots: Vec<String>,
    pub sport: SportType,
    pub origin: Option<BookingOrigin>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub is_public: Option<bool>,
    pub players_needed: Option<i32>,
}

#[derive(Deserialize)]
pub struct MarkStatusRequest {
    pub status: BookingStatus,
}

#[derive(Deserialize)]
pub struct ResolveJoinRequest {
    pub accept: bool,
}

#[derive(Deserialize)]
pub struct CreateSeriesRequest {
    pub court_id: String,
    /// ISO weekday, 1 = Monday .. 7 = Sunday.
    pub weekday: i32,
    pub start_time: String,
    pub slot_count: Option<i32>,
    pub sport: SportType,
    pub period: RecurrencePeriod,
    pub start_date: String,
    pub end_date: String,
    pub is_public: Option<bool>,
    pub players_needed: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct SeriesModeQuery {
    pub mode: Option<ConflictMode>,
}

#[derive(Deserialize)]
pub struct PaymentWebhookRequest {
    pub intent_id: String,
    pub status: String,
}
