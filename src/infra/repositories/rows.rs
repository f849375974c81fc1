use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use crate::domain::models::{
    booking::Booking,
    court::Court,
    join_request::JoinRequest,
    series::{weekday_from_number, RecurringSeries},
    slot::SlotDuration,
};
use crate::error::AppError;

fn corrupt(table: &str, id: &str, detail: String) -> AppError {
    AppError::InternalWithMsg(format!("Corrupt {} row {}: {}", table, id, detail))
}

#[derive(Debug, FromRow)]
pub struct CourtRow {
    pub id: String,
    pub arena_id: String,
    pub name: String,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub slot_duration_min: i32,
    pub hourly_rate_cents: i64,
    pub requires_upfront_payment: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CourtRow> for Court {
    type Error = AppError;

    fn try_from(row: CourtRow) -> Result<Self, Self::Error> {
        let slot_duration = SlotDuration::try_from(row.slot_duration_min)
            .map_err(|e| corrupt("courts", &row.id, e))?;
        Ok(Court {
            id: row.id,
            arena_id: row.arena_id,
            name: row.name,
            opens_at: row.opens_at,
            closes_at: row.closes_at,
            slot_duration,
            hourly_rate_cents: row.hourly_rate_cents,
            requires_upfront_payment: row.requires_upfront_payment,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct BookingRow {
    pub id: String,
    pub court_id: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_count: i32,
    pub sport: String,
    pub origin: String,
    pub athlete_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub status: String,
    pub is_fixed: bool,
    pub is_public: bool,
    pub players_needed: i32,
    pub series_id: Option<String>,
    pub rating: Option<i16>,
    pub payment_reference: Option<String>,
    pub payment_qr_payload: Option<String>,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub verification_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let sport = row.sport.parse().map_err(|e| corrupt("bookings", &row.id, e))?;
        let origin = row.origin.parse().map_err(|e| corrupt("bookings", &row.id, e))?;
        let status = row.status.parse().map_err(|e| corrupt("bookings", &row.id, e))?;
        Ok(Booking {
            id: row.id,
            court_id: row.court_id,
            date: row.booking_date,
            start_time: row.start_time,
            end_time: row.end_time,
            slot_count: row.slot_count,
            sport,
            origin,
            athlete_id: row.athlete_id,
            guest_name: row.guest_name,
            guest_phone: row.guest_phone,
            status,
            is_fixed: row.is_fixed,
            is_public: row.is_public,
            players_needed: row.players_needed,
            series_id: row.series_id,
            rating: row.rating,
            payment_reference: row.payment_reference,
            payment_qr_payload: row.payment_qr_payload,
            payment_deadline: row.payment_deadline,
            verification_code: row.verification_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SeriesRow {
    pub id: String,
    pub athlete_id: String,
    pub court_id: String,
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub slot_count: i32,
    pub sport: String,
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub is_public: bool,
    pub players_needed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SeriesRow> for RecurringSeries {
    type Error = AppError;

    fn try_from(row: SeriesRow) -> Result<Self, Self::Error> {
        let weekday = weekday_from_number(row.weekday)
            .ok_or_else(|| corrupt("recurring_series", &row.id, format!("weekday {}", row.weekday)))?;
        let sport = row.sport.parse().map_err(|e| corrupt("recurring_series", &row.id, e))?;
        let period = row.period.parse().map_err(|e| corrupt("recurring_series", &row.id, e))?;
        let status = row.status.parse().map_err(|e| corrupt("recurring_series", &row.id, e))?;
        Ok(RecurringSeries {
            id: row.id,
            athlete_id: row.athlete_id,
            court_id: row.court_id,
            weekday,
            start_time: row.start_time,
            slot_count: row.slot_count,
            sport,
            period,
            start_date: row.start_date,
            end_date: row.end_date,
            status,
            is_public: row.is_public,
            players_needed: row.players_needed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct JoinRequestRow {
    pub id: String,
    pub booking_id: String,
    pub athlete_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<JoinRequestRow> for JoinRequest {
    type Error = AppError;

    fn try_from(row: JoinRequestRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| corrupt("join_requests", &row.id, e))?;
        Ok(JoinRequest {
            id: row.id,
            booking_id: row.booking_id,
            athlete_id: row.athlete_id,
            status,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        })
    }
}

pub fn into_models<R, M>(rows: Vec<R>) -> Result<Vec<M>, AppError>
where
    M: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(M::try_from).collect()
}
