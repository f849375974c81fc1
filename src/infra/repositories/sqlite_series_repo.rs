use crate::domain::{models::{booking::Booking, series::{weekday_to_number, RecurringSeries, SeriesStatus}}, ports::SeriesRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::{into_models, BookingRow, SeriesRow};
use crate::infra::repositories::sqlite_booking_repo::insert_booking;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteSeriesRepo {
    pool: SqlitePool,
}

impl SqliteSeriesRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeriesRepository for SqliteSeriesRepo {
    async fn create_with_bookings(&self, series: &RecurringSeries, bookings: &[Booking]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query(
            "INSERT INTO recurring_series (id, athlete_id, court_id, weekday, start_time, slot_count, sport, period, start_date, end_date, status, is_public, players_needed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&series.id).bind(&series.athlete_id).bind(&series.court_id).bind(weekday_to_number(series.weekday))
            .bind(series.start_time).bind(series.slot_count).bind(series.sport.as_str()).bind(series.period.as_str())
            .bind(series.start_date).bind(series.end_date).bind(series.status.as_str()).bind(series.is_public)
            .bind(series.players_needed).bind(series.created_at).bind(series.updated_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        for booking in bookings {
            insert_booking(&mut *tx, booking).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RecurringSeries>, AppError> {
        sqlx::query_as::<_, SeriesRow>("SELECT * FROM recurring_series WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(RecurringSeries::try_from).transpose()
    }

    async fn list_bookings(&self, series_id: &str) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE series_id = ? ORDER BY booking_date ASC, start_time ASC")
            .bind(series_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        into_models(rows)
    }

    async fn update_status(&self, id: &str, status: SeriesStatus, now: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE recurring_series SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str()).bind(now).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound(format!("Series {} not found", id))); }
        Ok(())
    }
}
