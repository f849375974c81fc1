use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{info, warn};
use crate::domain::models::booking::{local_to_utc, Booking, BookingOrigin, BookingRequest, BookingStatus};
use crate::domain::models::series::{
    ConflictMode, RecurrencePeriod, RecurringSeries, SeriesCreated, SeriesDetail, SeriesRequest, SeriesStatus,
};
use crate::domain::ports::{BookingObserver, BookingRepository, Clock, SeriesRepository};
use crate::domain::services::booking_service::BookingService;
use crate::domain::services::locks::KeyedLocks;
use crate::domain::services::slot_calendar::{find_conflicts, grid, slot_key};
use crate::error::AppError;

const MAX_OCCURRENCES: usize = 120;

fn first_on_or_after(start: NaiveDate, weekday: Weekday) -> NaiveDate {
    let offset = (7 + weekday.num_days_from_monday() as i64 - start.weekday().num_days_from_monday() as i64) % 7;
    start + Duration::days(offset)
}

/// Ordinal of the weekday within its month, 1-based (the 2nd Tuesday is 2).
fn weekday_ordinal(date: NaiveDate) -> u8 {
    ((date.day() - 1) / 7 + 1) as u8
}

/// Calendar dates of a recurrence inside `[start, end]`.
///
/// Monthly recurrences repeat the ordinal weekday of the first occurrence, so a series starting on
/// the 2nd Tuesday stays on the 2nd Tuesday; months without a 5th weekday are skipped.
pub fn occurrence_dates(weekday: Weekday, period: RecurrencePeriod, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let first = first_on_or_after(start, weekday);
    if first > end {
        return Vec::new();
    }

    match period {
        RecurrencePeriod::Weekly | RecurrencePeriod::Biweekly => {
            let stride = if period == RecurrencePeriod::Weekly { 7 } else { 14 };
            let mut dates = Vec::new();
            let mut cursor = first;
            while cursor <= end {
                dates.push(cursor);
                cursor += Duration::days(stride);
            }
            dates
        }
        RecurrencePeriod::Monthly => {
            let ordinal = weekday_ordinal(first);
            let mut dates = vec![first];
            let mut month_start = first.with_day(1).unwrap_or(first);
            loop {
                month_start = match month_start.checked_add_months(Months::new(1)) {
                    Some(next) => next,
                    None => break,
                };
                if month_start > end {
                    break;
                }
                if let Some(date) = NaiveDate::from_weekday_of_month_opt(month_start.year(), month_start.month(), weekday, ordinal)
                    && date >= start && date <= end {
                    dates.push(date);
                }
            }
            dates
        }
    }
}

/// A series is active while any upcoming child still stands, cancelled once every child is.
pub fn derive_series_status(children: &[Booking], now: DateTime<Utc>, tz: &Tz) -> SeriesStatus {
    if children.iter().all(|b| b.status == BookingStatus::Cancelled) {
        return SeriesStatus::Cancelled;
    }
    let has_future = children.iter().any(|b| {
        b.status != BookingStatus::Cancelled && b.starts_at(tz).is_some_and(|start| start > now)
    });
    if has_future { SeriesStatus::Active } else { SeriesStatus::Finished }
}

pub struct RecurringPlanner {
    series: Arc<dyn SeriesRepository>,
    bookings: Arc<dyn BookingRepository>,
    booking_service: Arc<BookingService>,
    locks: Arc<KeyedLocks>,
    clock: Arc<dyn Clock>,
}

impl RecurringPlanner {
    pub fn new(
        series: Arc<dyn SeriesRepository>,
        bookings: Arc<dyn BookingRepository>,
        booking_service: Arc<BookingService>,
        locks: Arc<KeyedLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { series, bookings, booking_service, locks, clock }
    }

    pub async fn create_series(&self, request: SeriesRequest, mode: ConflictMode) -> Result<SeriesCreated, AppError> {
        if request.end_date < request.start_date {
            return Err(AppError::Validation("Series end date is before its start date".into()));
        }
        if request.slot_count < 1 {
            return Err(AppError::Validation("Series needs at least one slot per occurrence".into()));
        }

        let court = self.booking_service.find_court(&request.court_id).await?;
        let cells = grid(&court).len();
        if request.slot_count as usize > cells {
            return Err(AppError::InvalidSlotRange(format!(
                "{} slots do not fit on court {} ({} slots per day)", request.slot_count, court.id, cells
            )));
        }

        let now = self.clock.now();
        let tz = self.booking_service.settings().timezone;
        // Occurrences that already started are left out rather than failing the series.
        let dates = occurrence_dates(request.weekday, request.period, request.start_date, request.end_date)
            .into_iter()
            .filter(|date| local_to_utc(&tz, *date, request.start_time).is_none_or(|start| start > now))
            .collect::<Vec<_>>();
        if dates.is_empty() {
            return Err(AppError::InvalidSlotRange("Recurrence has no occurrences in the requested range".into()));
        }
        if dates.len() > MAX_OCCURRENCES {
            return Err(AppError::Validation(format!("Series would create {} bookings (max {})", dates.len(), MAX_OCCURRENCES)));
        }

        let step = court.slot_duration.minutes();
        let slots = (0..request.slot_count as i64)
            .map(|i| request.start_time + Duration::minutes(i * step))
            .collect::<Vec<_>>();

        let series = RecurringSeries::new(&request, now);

        let mut candidates = Vec::with_capacity(dates.len());
        for date in &dates {
            let booking_request = BookingRequest {
                court_id: court.id.clone(),
                date: *date,
                slots: slots.clone(),
                sport: request.sport,
                origin: BookingOrigin::Athlete,
                athlete_id: Some(request.athlete_id.clone()),
                guest_name: None,
                guest_phone: None,
                is_public: request.is_public,
                players_needed: request.players_needed,
            };
            candidates.push(self.booking_service.prepare(&court, &booking_request, Some(series.id.clone()), now)?);
        }

        let keys = dates.iter().map(|d| slot_key(&court.id, *d)).collect::<Vec<_>>();
        let _guards = self.locks.lock_all(&keys).await;

        let mut accepted = Vec::with_capacity(candidates.len());
        let mut skipped_dates = Vec::new();
        for candidate in candidates {
            let existing = self.bookings.load_for_court_date(&court.id, candidate.date).await?;
            let conflicts = find_conflicts(&existing, &court.id, candidate.date, &candidate.range());
            if conflicts.is_empty() {
                accepted.push(candidate);
                continue;
            }
            match mode {
                ConflictMode::AllOrNothing => {
                    return Err(AppError::SlotConflict(format!(
                        "{} {}-{} is already taken; series not created",
                        candidate.date, candidate.start_time.format("%H:%M"), candidate.end_time.format("%H:%M")
                    )));
                }
                ConflictMode::SkipConflicts => skipped_dates.push(candidate.date),
            }
        }

        if accepted.is_empty() {
            return Err(AppError::SlotConflict("Every occurrence of the series is already taken".into()));
        }

        self.series.create_with_bookings(&series, &accepted).await?;

        info!(
            series_id = %series.id,
            court_id = %court.id,
            created = accepted.len(),
            skipped = skipped_dates.len(),
            "Recurring series created"
        );

        Ok(SeriesCreated { series, bookings: accepted, skipped_dates })
    }

    pub async fn get_series(&self, series_id: &str) -> Result<SeriesDetail, AppError> {
        let series = self.series.find_by_id(series_id).await?
            .ok_or(AppError::NotFound(format!("Series {} not found", series_id)))?;
        let bookings = self.series.list_bookings(series_id).await?;
        Ok(SeriesDetail { series, bookings })
    }

    /// Cancels every upcoming PENDENTE child. Status of the series follows through the observer.
    pub async fn cancel_series(&self, series_id: &str, athlete_id: &str) -> Result<SeriesDetail, AppError> {
        let detail = self.get_series(series_id).await?;
        if detail.series.athlete_id != athlete_id {
            return Err(AppError::Forbidden("Only the series owner can cancel it".into()));
        }

        let now = self.clock.now();
        let tz = self.booking_service.settings().timezone;
        for child in &detail.bookings {
            let upcoming = child.starts_at(&tz).is_some_and(|start| start > now);
            if child.status != BookingStatus::Pending || !upcoming {
                continue;
            }
            if let Err(e) = self.booking_service.mark_status(&child.id, BookingStatus::Cancelled).await {
                warn!(series_id = %series_id, booking_id = %child.id, "Could not cancel series child: {}", e);
            }
        }

        info!(series_id = %series_id, "Series cancellation processed");
        self.get_series(series_id).await
    }
}

/// Keeps `RecurringSeries.status` in line with its children after every transition.
pub struct SeriesStatusObserver {
    series: Arc<dyn SeriesRepository>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl SeriesStatusObserver {
    pub fn new(series: Arc<dyn SeriesRepository>, clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self { series, clock, timezone }
    }
}

#[async_trait]
impl BookingObserver for SeriesStatusObserver {
    async fn on_transition(&self, booking: &Booking, _from: BookingStatus) -> Result<(), AppError> {
        let Some(series_id) = &booking.series_id else {
            return Ok(());
        };
        let Some(series) = self.series.find_by_id(series_id).await? else {
            warn!(series_id = %series_id, booking_id = %booking.id, "Booking references a missing series");
            return Ok(());
        };

        let now = self.clock.now();
        let children = self.series.list_bookings(series_id).await?;
        let status = derive_series_status(&children, now, &self.timezone);
        if status != series.status {
            self.series.update_status(series_id, status, now).await?;
            info!(series_id = %series_id, status = status.as_str(), "Series status recomputed");
        }
        Ok(())
    }
}
