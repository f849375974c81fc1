use crate::domain::{models::booking::{Booking, BookingFilter, BookingStatus}, ports::BookingRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::{into_models, BookingRow};
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use chrono::{DateTime, NaiveDate, Utc};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Inserts, then re-checks overlap inside the caller's transaction. Writing first makes SQLite take
/// the write lock before the check, so concurrent writers queue on `busy_timeout` instead of
/// failing on a stale snapshot. The caller's transaction rolls back on error.
pub(crate) async fn insert_booking(conn: &mut SqliteConnection, booking: &Booking) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO bookings (id, court_id, booking_date, start_time, end_time, slot_count, sport, origin, athlete_id, guest_name, guest_phone, status, is_fixed, is_public, players_needed, series_id, rating, payment_reference, payment_qr_payload, payment_deadline, verification_code, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
        .bind(&booking.id).bind(&booking.court_id).bind(booking.date).bind(booking.start_time).bind(booking.end_time)
        .bind(booking.slot_count).bind(booking.sport.as_str()).bind(booking.origin.as_str()).bind(&booking.athlete_id)
        .bind(&booking.guest_name).bind(&booking.guest_phone).bind(booking.status.as_str()).bind(booking.is_fixed)
        .bind(booking.is_public).bind(booking.players_needed).bind(&booking.series_id).bind(booking.rating)
        .bind(&booking.payment_reference).bind(&booking.payment_qr_payload).bind(booking.payment_deadline)
        .bind(&booking.verification_code).bind(booking.created_at).bind(booking.updated_at)
        .execute(&mut *conn).await.map_err(AppError::Database)?;

    let overlapping: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE court_id = ? AND booking_date = ? AND id != ? AND status != 'CANCELADO' AND start_time < ? AND end_time > ?"
    )
        .bind(&booking.court_id).bind(booking.date).bind(&booking.id).bind(booking.end_time).bind(booking.start_time)
        .fetch_one(&mut *conn).await.map_err(AppError::Database)?;
    if overlapping > 0 {
        return Err(AppError::SlotConflict(format!(
            "{} {}-{} is already booked on court {}",
            booking.date, booking.start_time.format("%H:%M"), booking.end_time.format("%H:%M"), booking.court_id
        )));
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(Booking::try_from).transpose()
    }

    async fn find_by_payment_reference(&self, reference: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE payment_reference = ?").bind(reference).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(Booking::try_from).transpose()
    }

    async fn load_for_court_date(&self, court_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE court_id = ? AND booking_date = ? ORDER BY start_time ASC")
            .bind(court_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        into_models(rows)
    }

    async fn search(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings
             WHERE (?1 IS NULL OR court_id = ?1)
               AND (?2 IS NULL OR athlete_id = ?2)
               AND (?3 IS NULL OR series_id = ?3)
               AND (?4 IS NULL OR booking_date >= ?4)
               AND (?5 IS NULL OR booking_date <= ?5)
               AND (?6 IS NULL OR status = ?6)
               AND (?7 IS NULL OR is_public = ?7)
             ORDER BY booking_date ASC, start_time ASC"
        )
            .bind(&filter.court_id).bind(&filter.athlete_id).bind(&filter.series_id)
            .bind(filter.date_from).bind(filter.date_to)
            .bind(filter.status.map(BookingStatus::as_str)).bind(filter.is_public)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        into_models(rows)
    }

    async fn insert_all(&self, bookings: &[Booking]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for booking in bookings {
            insert_booking(&mut *tx, booking).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn transition(&self, id: &str, from: BookingStatus, to: BookingStatus, now: DateTime<Utc>) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings SET status = ?, payment_deadline = NULL, updated_at = ? WHERE id = ? AND status = ? RETURNING *"
        )
            .bind(to.as_str()).bind(now).bind(id).bind(from.as_str())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(Booking::try_from).transpose()
    }

    async fn find_awaiting_payment_before(&self, created_before: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE status = 'AGUARDANDO_PAGAMENTO' AND created_at < ? ORDER BY created_at ASC"
        )
            .bind(created_before)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        into_models(rows)
    }
}
