use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinRequestStatus {
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "ACEITO")]
    Accepted,
    #[serde(rename = "RECUSADO")]
    Rejected,
}

impl JoinRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "PENDENTE",
            JoinRequestStatus::Accepted => "ACEITO",
            JoinRequestStatus::Rejected => "RECUSADO",
        }
    }
}

impl FromStr for JoinRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDENTE" => Ok(JoinRequestStatus::Pending),
            "ACEITO" => Ok(JoinRequestStatus::Accepted),
            "RECUSADO" => Ok(JoinRequestStatus::Rejected),
            other => Err(format!("unknown join request status: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JoinRequest {
    pub id: String,
    pub booking_id: String,
    pub athlete_id: String,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl JoinRequest {
    pub fn new(booking_id: String, athlete_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            athlete_id,
            status: JoinRequestStatus::Pending,
            created_at: now,
            resolved_at: None,
        }
    }
}
