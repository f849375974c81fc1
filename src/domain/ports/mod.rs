use crate::domain::models::{
    court::Court,
    booking::{Booking, BookingFilter, BookingStatus},
    series::{RecurringSeries, SeriesStatus},
    join_request::{JoinRequest, JoinRequestStatus},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[async_trait]
pub trait CourtRepository: Send + Sync {
    async fn create(&self, court: &Court) -> Result<Court, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Court>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_payment_reference(&self, reference: &str) -> Result<Option<Booking>, AppError>;
    /// Every booking on the court for the date, cancelled ones included, ordered by start time.
    async fn load_for_court_date(&self, court_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn search(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;
    /// Inserts in one transaction. Fails with `SlotConflict` if any booking overlaps an active one.
    async fn insert_all(&self, bookings: &[Booking]) -> Result<(), AppError>;
    /// Conditional status update keyed on the current status. `None` when the row was no longer in `from`.
    async fn transition(&self, id: &str, from: BookingStatus, to: BookingStatus, now: DateTime<Utc>) -> Result<Option<Booking>, AppError>;
    async fn find_awaiting_payment_before(&self, created_before: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
}

#[async_trait]
pub trait SeriesRepository: Send + Sync {
    async fn create_with_bookings(&self, series: &RecurringSeries, bookings: &[Booking]) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<RecurringSeries>, AppError>;
    async fn list_bookings(&self, series_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn update_status(&self, id: &str, status: SeriesStatus, now: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait JoinRequestRepository: Send + Sync {
    async fn create(&self, request: &JoinRequest) -> Result<JoinRequest, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<JoinRequest>, AppError>;
    async fn find_active_for_athlete(&self, booking_id: &str, athlete_id: &str) -> Result<Option<JoinRequest>, AppError>;
    async fn count_accepted(&self, booking_id: &str) -> Result<i64, AppError>;
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<JoinRequest>, AppError>;
    /// Moves a PENDENTE request to `status`. With `capacity` set, the update only applies while
    /// fewer than `capacity` requests are accepted for the booking. `None` when nothing changed.
    async fn resolve(&self, id: &str, status: JoinRequestStatus, capacity: Option<i32>, now: DateTime<Utc>) -> Result<Option<JoinRequest>, AppError>;
    async fn reject_pending_for_booking(&self, booking_id: &str, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub qr_payload: String,
    pub expiry: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, booking: &Booking, amount_cents: i64) -> Result<PaymentIntent, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", content = "to", rename_all = "lowercase")]
pub enum Recipient {
    Push(String),
    Sms(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &Recipient, message: &str) -> Result<(), AppError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait VerificationCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Receives every committed booking status change, after the fact.
#[async_trait]
pub trait BookingObserver: Send + Sync {
    async fn on_transition(&self, booking: &Booking, from: BookingStatus) -> Result<(), AppError>;
}
