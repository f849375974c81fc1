use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use std::str::FromStr;
use crate::domain::models::booking::{Booking, SportType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrencePeriod {
    #[serde(rename = "SEMANAL")]
    Weekly,
    #[serde(rename = "QUINZENAL")]
    Biweekly,
    #[serde(rename = "MENSAL")]
    Monthly,
}

impl RecurrencePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrencePeriod::Weekly => "SEMANAL",
            RecurrencePeriod::Biweekly => "QUINZENAL",
            RecurrencePeriod::Monthly => "MENSAL",
        }
    }
}

impl FromStr for RecurrencePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SEMANAL" => Ok(RecurrencePeriod::Weekly),
            "QUINZENAL" => Ok(RecurrencePeriod::Biweekly),
            "MENSAL" => Ok(RecurrencePeriod::Monthly),
            other => Err(format!("unknown recurrence period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesStatus {
    #[serde(rename = "ATIVO")]
    Active,
    #[serde(rename = "CANCELADO")]
    Cancelled,
    #[serde(rename = "FINALIZADO")]
    Finished,
}

impl SeriesStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesStatus::Active => "ATIVO",
            SeriesStatus::Cancelled => "CANCELADO",
            SeriesStatus::Finished => "FINALIZADO",
        }
    }
}

impl FromStr for SeriesStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ATIVO" => Ok(SeriesStatus::Active),
            "CANCELADO" => Ok(SeriesStatus::Cancelled),
            "FINALIZADO" => Ok(SeriesStatus::Finished),
            other => Err(format!("unknown series status: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecurringSeries {
    pub id: String,
    pub athlete_id: String,
    pub court_id: String,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub slot_count: i32,
    pub sport: SportType,
    pub period: RecurrencePeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SeriesStatus,
    pub is_public: bool,
    pub players_needed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringSeries {
    pub fn new(request: &SeriesRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            athlete_id: request.athlete_id.clone(),
            court_id: request.court_id.clone(),
            weekday: request.weekday,
            start_time: request.start_time,
            slot_count: request.slot_count,
            sport: request.sport,
            period: request.period,
            start_date: request.start_date,
            end_date: request.end_date,
            status: SeriesStatus::Active,
            is_public: request.is_public,
            players_needed: request.players_needed,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeriesRequest {
    pub athlete_id: String,
    pub court_id: String,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub slot_count: i32,
    pub sport: SportType,
    pub period: RecurrencePeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_public: bool,
    pub players_needed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMode {
    #[default]
    AllOrNothing,
    SkipConflicts,
}

#[derive(Debug, Serialize, Clone)]
pub struct SeriesCreated {
    pub series: RecurringSeries,
    pub bookings: Vec<Booking>,
    pub skipped_dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SeriesDetail {
    pub series: RecurringSeries,
    pub bookings: Vec<Booking>,
}

pub fn weekday_to_number(weekday: Weekday) -> i32 {
    weekday.number_from_monday() as i32
}

pub fn weekday_from_number(number: i32) -> Option<Weekday> {
    match number {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}
