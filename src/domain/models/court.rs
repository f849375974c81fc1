use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveTime, Utc};
use crate::domain::models::slot::SlotDuration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Court {
    pub id: String,
    pub arena_id: String,
    pub name: String,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub slot_duration: SlotDuration,
    pub hourly_rate_cents: i64,
    pub requires_upfront_payment: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewCourtParams {
    pub arena_id: String,
    pub name: String,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub slot_duration: SlotDuration,
    pub hourly_rate_cents: i64,
    pub requires_upfront_payment: bool,
}

impl Court {
    pub fn new(params: NewCourtParams, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            arena_id: params.arena_id,
            name: params.name,
            opens_at: params.opens_at,
            closes_at: params.closes_at,
            slot_duration: params.slot_duration,
            hourly_rate_cents: params.hourly_rate_cents,
            requires_upfront_payment: params.requires_upfront_payment,
            created_at: now,
        }
    }

    pub fn price_cents(&self, minutes: i64) -> i64 {
        self.hourly_rate_cents * minutes / 60
    }
}
