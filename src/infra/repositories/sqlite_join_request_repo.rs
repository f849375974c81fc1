use crate::domain::{models::join_request::{JoinRequest, JoinRequestStatus}, ports::JoinRequestRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::{into_models, JoinRequestRow};
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteJoinRequestRepo {
    pool: SqlitePool,
}

impl SqliteJoinRequestRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JoinRequestRepository for SqliteJoinRequestRepo {
    async fn create(&self, request: &JoinRequest) -> Result<JoinRequest, AppError> {
        let row = sqlx::query_as::<_, JoinRequestRow>(
            "INSERT INTO join_requests (id, booking_id, athlete_id, status, created_at, resolved_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&request.id).bind(&request.booking_id).bind(&request.athlete_id)
            .bind(request.status.as_str()).bind(request.created_at).bind(request.resolved_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        JoinRequest::try_from(row)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<JoinRequest>, AppError> {
        sqlx::query_as::<_, JoinRequestRow>("SELECT * FROM join_requests WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(JoinRequest::try_from).transpose()
    }

    async fn find_active_for_athlete(&self, booking_id: &str, athlete_id: &str) -> Result<Option<JoinRequest>, AppError> {
        sqlx::query_as::<_, JoinRequestRow>(
            "SELECT * FROM join_requests WHERE booking_id = ? AND athlete_id = ? AND status != 'RECUSADO' LIMIT 1"
        )
            .bind(booking_id).bind(athlete_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(JoinRequest::try_from).transpose()
    }

    async fn count_accepted(&self, booking_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM join_requests WHERE booking_id = ? AND status = 'ACEITO'")
            .bind(booking_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<JoinRequest>, AppError> {
        let rows = sqlx::query_as::<_, JoinRequestRow>("SELECT * FROM join_requests WHERE booking_id = ? ORDER BY created_at ASC")
            .bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        into_models(rows)
    }

    async fn resolve(&self, id: &str, status: JoinRequestStatus, capacity: Option<i32>, now: DateTime<Utc>) -> Result<Option<JoinRequest>, AppError> {
        // The capacity check and the update are one statement, so two accepts cannot both pass it.
        sqlx::query_as::<_, JoinRequestRow>(
            "UPDATE join_requests SET status = ?1, resolved_at = ?2
             WHERE id = ?3 AND status = 'PENDENTE'
               AND (?4 IS NULL OR (
                   SELECT COUNT(*) FROM join_requests
                   WHERE booking_id = (SELECT booking_id FROM join_requests WHERE id = ?3) AND status = 'ACEITO'
               ) < ?4)
             RETURNING *"
        )
            .bind(status.as_str()).bind(now).bind(id).bind(capacity)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(JoinRequest::try_from).transpose()
    }

    async fn reject_pending_for_booking(&self, booking_id: &str, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE join_requests SET status = 'RECUSADO', resolved_at = ? WHERE booking_id = ? AND status = 'PENDENTE'")
            .bind(now).bind(booking_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
