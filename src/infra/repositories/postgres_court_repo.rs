use crate::domain::{models::court::Court, ports::CourtRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::CourtRow;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCourtRepo {
    pool: PgPool,
}

impl PostgresCourtRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourtRepository for PostgresCourtRepo {
    async fn create(&self, court: &Court) -> Result<Court, AppError> {
        let row = sqlx::query_as::<_, CourtRow>("INSERT INTO courts (id, arena_id, name, opens_at, closes_at, slot_duration_min, hourly_rate_cents, requires_upfront_payment, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *").bind(&court.id).bind(&court.arena_id).bind(&court.name).bind(court.opens_at).bind(court.closes_at).bind(i32::from(court.slot_duration)).bind(court.hourly_rate_cents).bind(court.requires_upfront_payment).bind(court.created_at).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Court::try_from(row)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Court>, AppError> {
        sqlx::query_as::<_, CourtRow>("SELECT * FROM courts WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?.map(Court::try_from).transpose()
    }
}
