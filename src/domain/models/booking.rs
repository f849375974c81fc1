use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use crate::domain::models::slot::SlotRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    #[serde(rename = "AGUARDANDO_PAGAMENTO")]
    AwaitingPayment,
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "PAGO")]
    Paid,
    #[serde(rename = "AUSENTE")]
    Absent,
    #[serde(rename = "CANCELADO")]
    Cancelled,
}

/// Causes that can move a booking between stored states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ConfirmPayment,
    Expire,
    Mark(BookingStatus),
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::AwaitingPayment => "AGUARDANDO_PAGAMENTO",
            BookingStatus::Pending => "PENDENTE",
            BookingStatus::Paid => "PAGO",
            BookingStatus::Absent => "AUSENTE",
            BookingStatus::Cancelled => "CANCELADO",
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(self, BookingStatus::Paid | BookingStatus::Absent | BookingStatus::Cancelled)
    }

    /// The transition table. `None` means the move is not allowed from `self`.
    pub fn next(self, transition: Transition) -> Option<BookingStatus> {
        match (self, transition) {
            (BookingStatus::AwaitingPayment, Transition::ConfirmPayment) => Some(BookingStatus::Pending),
            (BookingStatus::AwaitingPayment, Transition::Expire) => Some(BookingStatus::Cancelled),
            (BookingStatus::Pending, Transition::Mark(target @ (BookingStatus::Paid | BookingStatus::Absent | BookingStatus::Cancelled))) => Some(target),
            _ => None,
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AGUARDANDO_PAGAMENTO" => Ok(BookingStatus::AwaitingPayment),
            "PENDENTE" => Ok(BookingStatus::Pending),
            "PAGO" => Ok(BookingStatus::Paid),
            "AUSENTE" => Ok(BookingStatus::Absent),
            "CANCELADO" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// What clients see. `Finalized` is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayStatus {
    #[serde(rename = "AGUARDANDO_PAGAMENTO")]
    AwaitingPayment,
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "PAGO")]
    Paid,
    #[serde(rename = "AUSENTE")]
    Absent,
    #[serde(rename = "CANCELADO")]
    Cancelled,
    #[serde(rename = "FINALIZADO")]
    Finalized,
}

pub fn compute_display_status(stored: BookingStatus, booking_end: DateTime<Utc>, now: DateTime<Utc>) -> DisplayStatus {
    if stored.is_settled() && booking_end <= now {
        return DisplayStatus::Finalized;
    }
    match stored {
        BookingStatus::AwaitingPayment => DisplayStatus::AwaitingPayment,
        BookingStatus::Pending => DisplayStatus::Pending,
        BookingStatus::Paid => DisplayStatus::Paid,
        BookingStatus::Absent => DisplayStatus::Absent,
        BookingStatus::Cancelled => DisplayStatus::Cancelled,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SportType {
    Futebol,
    Futsal,
    Volei,
    Futevolei,
    BeachTennis,
    Tenis,
    Padel,
    Basquete,
}

impl SportType {
    pub fn as_str(self) -> &'static str {
        match self {
            SportType::Futebol => "FUTEBOL",
            SportType::Futsal => "FUTSAL",
            SportType::Volei => "VOLEI",
            SportType::Futevolei => "FUTEVOLEI",
            SportType::BeachTennis => "BEACH_TENNIS",
            SportType::Tenis => "TENIS",
            SportType::Padel => "PADEL",
            SportType::Basquete => "BASQUETE",
        }
    }
}

impl FromStr for SportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FUTEBOL" => Ok(SportType::Futebol),
            "FUTSAL" => Ok(SportType::Futsal),
            "VOLEI" => Ok(SportType::Volei),
            "FUTEVOLEI" => Ok(SportType::Futevolei),
            "BEACH_TENNIS" => Ok(SportType::BeachTennis),
            "TENIS" => Ok(SportType::Tenis),
            "PADEL" => Ok(SportType::Padel),
            "BASQUETE" => Ok(SportType::Basquete),
            other => Err(format!("unknown sport: {}", other)),
        }
    }
}

/// Who asked for the booking. Only athlete bookings can require upfront payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingOrigin {
    #[serde(rename = "ATLETA")]
    Athlete,
    #[serde(rename = "ARENA")]
    Arena,
    #[serde(rename = "AULA")]
    Class,
}

impl BookingOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingOrigin::Athlete => "ATLETA",
            BookingOrigin::Arena => "ARENA",
            BookingOrigin::Class => "AULA",
        }
    }
}

impl FromStr for BookingOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ATLETA" => Ok(BookingOrigin::Athlete),
            "ARENA" => Ok(BookingOrigin::Arena),
            "AULA" => Ok(BookingOrigin::Class),
            other => Err(format!("unknown booking origin: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    pub id: String,
    pub court_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_count: i32,
    pub sport: SportType,
    pub origin: BookingOrigin,
    pub athlete_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub status: BookingStatus,
    pub is_fixed: bool,
    pub is_public: bool,
    pub players_needed: i32,
    pub series_id: Option<String>,
    pub rating: Option<i16>,
    pub payment_reference: Option<String>,
    pub payment_qr_payload: Option<String>,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub verification_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub court_id: String,
    pub date: NaiveDate,
    pub range: SlotRange,
    pub sport: SportType,
    pub origin: BookingOrigin,
    pub athlete_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub is_public: bool,
    pub players_needed: i32,
    pub series_id: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            court_id: params.court_id,
            date: params.date,
            start_time: params.range.start,
            end_time: params.range.end,
            slot_count: params.range.slot_count,
            sport: params.sport,
            origin: params.origin,
            athlete_id: params.athlete_id,
            guest_name: params.guest_name,
            guest_phone: params.guest_phone,
            status: BookingStatus::Pending,
            is_fixed: params.series_id.is_some(),
            is_public: params.is_public,
            players_needed: if params.is_public { params.players_needed } else { 0 },
            series_id: params.series_id,
            rating: None,
            payment_reference: None,
            payment_qr_payload: None,
            payment_deadline: None,
            verification_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn range(&self) -> SlotRange {
        SlotRange { start: self.start_time, end: self.end_time, slot_count: self.slot_count }
    }

    pub fn starts_at(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        local_to_utc(tz, self.date, self.start_time)
    }

    pub fn ends_at(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        local_to_utc(tz, self.date, self.end_time)
    }
}

/// Resolves a court-local wall-clock time. Gaps (DST spring-forward) yield `None`.
pub fn local_to_utc(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Serialize, Clone)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub display_status: DisplayStatus,
}

/// Everything the caller supplies when reserving one or more contiguous slots.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub court_id: String,
    pub date: NaiveDate,
    pub slots: Vec<NaiveTime>,
    pub sport: SportType,
    pub origin: BookingOrigin,
    pub athlete_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub is_public: bool,
    pub players_needed: i32,
}

/// Filter criteria for booking searches. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub court_id: Option<String>,
    pub athlete_id: Option<String>,
    pub series_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    pub is_public: Option<bool>,
}
