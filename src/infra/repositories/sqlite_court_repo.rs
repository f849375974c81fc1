use crate::domain::{models::court::Court, ports::CourtRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::CourtRow;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCourtRepo {
    pool: SqlitePool,
}

impl SqliteCourtRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourtRepository for SqliteCourtRepo {
    async fn create(&self, court: &Court) -> Result<Court, AppError> {
        let row = sqlx::query_as::<_, CourtRow>(
            "INSERT INTO courts (id, arena_id, name, opens_at, closes_at, slot_duration_min, hourly_rate_cents, requires_upfront_payment, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&court.id)
            .bind(&court.arena_id)
            .bind(&court.name)
            .bind(court.opens_at)
            .bind(court.closes_at)
            .bind(i32::from(court.slot_duration))
            .bind(court.hourly_rate_cents)
            .bind(court.requires_upfront_payment)
            .bind(court.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Court::try_from(row)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Court>, AppError> {
        sqlx::query_as::<_, CourtRow>("SELECT * FROM courts WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(Court::try_from).transpose()
    }
}
