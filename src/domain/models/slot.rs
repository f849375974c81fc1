use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Grid step of a court. Every booking is a run of one or more of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SlotDuration {
    Min30,
    Min60,
    Min90,
    Min120,
}

impl SlotDuration {
    pub fn minutes(self) -> i64 {
        match self {
            SlotDuration::Min30 => 30,
            SlotDuration::Min60 => 60,
            SlotDuration::Min90 => 90,
            SlotDuration::Min120 => 120,
        }
    }

    pub fn from_minutes(minutes: i32) -> Option<Self> {
        match minutes {
            30 => Some(SlotDuration::Min30),
            60 => Some(SlotDuration::Min60),
            90 => Some(SlotDuration::Min90),
            120 => Some(SlotDuration::Min120),
            _ => None,
        }
    }
}

impl TryFrom<i32> for SlotDuration {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        SlotDuration::from_minutes(value).ok_or_else(|| format!("unsupported slot duration: {} minutes", value))
    }
}

impl From<SlotDuration> for i32 {
    fn from(value: SlotDuration) -> Self {
        value.minutes() as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub court_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Half-open `[start, end)` span of local wall-clock time on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub slot_count: i32,
}

impl SlotRange {
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start < end && start < self.end
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

pub fn minute_of_day(time: NaiveTime) -> i64 {
    (time.hour() * 60 + time.minute()) as i64
}

pub fn time_from_minute(minute: i64) -> Option<NaiveTime> {
    if !(0..1440).contains(&minute) {
        return None;
    }
    NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
}
