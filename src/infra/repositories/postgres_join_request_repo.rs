use crate::domain::{models::join_request::{JoinRequest, JoinRequestStatus}, ports::JoinRequestRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::{into_models, JoinRequestRow};
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::{DateTime, Utc};

pub struct PostgresJoinRequestRepo {
    pool: PgPool,
}

impl PostgresJoinRequestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JoinRequestRepository for PostgresJoinRequestRepo {
    async fn create(&self, request: &JoinRequest) -> Result<JoinRequest, AppError> {
        let row = sqlx::query_as::<_, JoinRequestRow>("INSERT INTO join_requests (id, booking_id, athlete_id, status, created_at, resolved_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *").bind(&request.id).bind(&request.booking_id).bind(&request.athlete_id).bind(request.status.as_str()).bind(request.created_at).bind(request.resolved_at).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        JoinRequest::try_from(row)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<JoinRequest>, AppError> {
        sqlx::query_as::<_, JoinRequestRow>("SELECT * FROM join_requests WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?.map(JoinRequest::try_from).transpose()
    }
    async fn find_active_for_athlete(&self, booking_id: &str, athlete_id: &str) -> Result<Option<JoinRequest>, AppError> {
        sqlx::query_as::<_, JoinRequestRow>("SELECT * FROM join_requests WHERE booking_id = $1 AND athlete_id = $2 AND status != 'RECUSADO' LIMIT 1").bind(booking_id).bind(athlete_id).fetch_optional(&self.pool).await.map_err(AppError::Database)?.map(JoinRequest::try_from).transpose()
    }
    async fn count_accepted(&self, booking_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM join_requests WHERE booking_id = $1 AND status = 'ACEITO'").bind(booking_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<JoinRequest>, AppError> {
        let rows = sqlx::query_as::<_, JoinRequestRow>("SELECT * FROM join_requests WHERE booking_id = $1 ORDER BY created_at ASC").bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        into_models(rows)
    }

    async fn resolve(&self, id: &str, status: JoinRequestStatus, capacity: Option<i32>, now: DateTime<Utc>) -> Result<Option<JoinRequest>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock on the parent booking keeps concurrent accepts from reading the same count.
        let booking_id: Option<String> = sqlx::query_scalar(
            "SELECT b.id FROM bookings b JOIN join_requests r ON r.booking_id = b.id WHERE r.id = $1 FOR UPDATE OF b"
        )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let Some(booking_id) = booking_id else {
            return Ok(None);
        };

        let resolved = sqlx::query_as::<_, JoinRequestRow>(
            "UPDATE join_requests SET status = $1, resolved_at = $2
             WHERE id = $3 AND status = 'PENDENTE'
               AND ($4::INTEGER IS NULL OR (SELECT COUNT(*) FROM join_requests WHERE booking_id = $5 AND status = 'ACEITO') < $4::INTEGER)
             RETURNING *"
        )
            .bind(status.as_str()).bind(now).bind(id).bind(capacity).bind(&booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        resolved.map(JoinRequest::try_from).transpose()
    }

    async fn reject_pending_for_booking(&self, booking_id: &str, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE join_requests SET status = 'RECUSADO', resolved_at = $1 WHERE booking_id = $2 AND status = 'PENDENTE'").bind(now).bind(booking_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
