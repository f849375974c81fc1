use chrono::{NaiveDate, NaiveTime, Timelike};
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::court::Court;
use crate::domain::models::slot::{minute_of_day, time_from_minute, Slot, SlotRange};
use crate::error::AppError;

/// Lock key serialising creations on one court and date.
pub fn slot_key(court_id: &str, date: NaiveDate) -> String {
    format!("court:{}:{}", court_id, date)
}

/// The court's bookable grid for a day as `(start, end)` pairs.
pub fn grid(court: &Court) -> Vec<(NaiveTime, NaiveTime)> {
    let step = court.slot_duration.minutes();
    let open = minute_of_day(court.opens_at);
    let close = minute_of_day(court.closes_at);

    let mut cells = Vec::new();
    let mut cursor = open;
    while cursor + step <= close {
        if let (Some(start), Some(end)) = (time_from_minute(cursor), time_from_minute(cursor + step)) {
            cells.push((start, end));
        }
        cursor += step;
    }
    cells
}

fn on_grid(court: &Court, start: NaiveTime) -> bool {
    if start.second() != 0 || start.nanosecond() != 0 {
        return false;
    }
    let step = court.slot_duration.minutes();
    let open = minute_of_day(court.opens_at);
    let close = minute_of_day(court.closes_at);
    let minute = minute_of_day(start);
    minute >= open && (minute - open) % step == 0 && minute + step <= close
}

/// Turns requested slot starts into one span. Order of the input does not matter, but the
/// slots must sit on the court grid and follow each other without gaps or repeats.
pub fn resolve_range(court: &Court, slots: &[NaiveTime]) -> Result<SlotRange, AppError> {
    if slots.is_empty() {
        return Err(AppError::InvalidSlotRange("at least one slot is required".into()));
    }

    let mut starts = slots.to_vec();
    starts.sort();

    if let Some(off_grid) = starts.iter().find(|s| !on_grid(court, **s)) {
        return Err(AppError::InvalidSlotRange(format!(
            "{} is not a bookable slot on court {} (grid of {} minutes from {} to {})",
            off_grid.format("%H:%M"), court.id, court.slot_duration.minutes(),
            court.opens_at.format("%H:%M"), court.closes_at.format("%H:%M")
        )));
    }

    let step = court.slot_duration.minutes();
    for pair in starts.windows(2) {
        if minute_of_day(pair[1]) - minute_of_day(pair[0]) != step {
            return Err(AppError::InvalidSlotRange(format!(
                "slots {} and {} are not contiguous",
                pair[0].format("%H:%M"), pair[1].format("%H:%M")
            )));
        }
    }

    let first = starts[0];
    let last = starts[starts.len() - 1];
    let end = time_from_minute(minute_of_day(last) + step)
        .ok_or_else(|| AppError::InvalidSlotRange("slot range crosses midnight".into()))?;

    Ok(SlotRange { start: first, end, slot_count: starts.len() as i32 })
}

pub fn is_contiguous(court: &Court, slots: &[NaiveTime]) -> bool {
    resolve_range(court, slots).is_ok()
}

/// Active bookings on the court and date that intersect `range`.
pub fn find_conflicts<'a>(existing: &'a [Booking], court_id: &str, date: NaiveDate, range: &SlotRange) -> Vec<&'a Booking> {
    existing
        .iter()
        .filter(|b| b.court_id == court_id && b.date == date)
        .filter(|b| b.status != BookingStatus::Cancelled)
        .filter(|b| range.overlaps(b.start_time, b.end_time))
        .collect()
}

pub fn ensure_free(existing: &[Booking], court_id: &str, date: NaiveDate, range: &SlotRange) -> Result<(), AppError> {
    let conflicts = find_conflicts(existing, court_id, date, range);
    if let Some(first) = conflicts.first() {
        return Err(AppError::SlotConflict(format!(
            "{}-{} on {} overlaps booking {} ({}-{})",
            range.start.format("%H:%M"), range.end.format("%H:%M"), date,
            first.id, first.start_time.format("%H:%M"), first.end_time.format("%H:%M")
        )));
    }
    Ok(())
}

pub fn available_slots(court: &Court, date: NaiveDate, existing: &[Booking]) -> Vec<Slot> {
    grid(court)
        .into_iter()
        .filter(|(start, end)| {
            let cell = SlotRange { start: *start, end: *end, slot_count: 1 };
            find_conflicts(existing, &court.id, date, &cell).is_empty()
        })
        .map(|(start_time, end_time)| Slot {
            court_id: court.id.clone(),
            date,
            start_time,
            end_time,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use crate::domain::models::booking::{BookingOrigin, NewBookingParams, SportType};
    use crate::domain::models::court::NewCourtParams;
    use crate::domain::models::slot::SlotDuration;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2031-03-03T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn court(step: SlotDuration) -> Court {
        Court::new(NewCourtParams {
            arena_id: "arena-1".into(),
            name: "Quadra 1".into(),
            opens_at: t(8, 0),
            closes_at: t(22, 0),
            slot_duration: step,
            hourly_rate_cents: 12000,
            requires_upfront_payment: false,
        }, now())
    }

    fn booking(court: &Court, date: NaiveDate, start: NaiveTime, end: NaiveTime, status: BookingStatus) -> Booking {
        let mut b = Booking::new(NewBookingParams {
            court_id: court.id.clone(),
            date,
            range: SlotRange { start, end, slot_count: 1 },
            sport: SportType::Futebol,
            origin: BookingOrigin::Arena,
            athlete_id: None,
            guest_name: Some("Guest".into()),
            guest_phone: None,
            is_public: false,
            players_needed: 0,
            series_id: None,
        }, now());
        b.status = status;
        b
    }

    #[test]
    fn test_grid_respects_opening_hours() {
        let c = court(SlotDuration::Min90);
        let cells = grid(&c);
        assert_eq!(cells.first(), Some(&(t(8, 0), t(9, 30))));
        // 08:00 + 9 * 90min = 21:30, which would end after closing
        assert_eq!(cells.len(), 9);
        assert_eq!(cells.last(), Some(&(t(20, 0), t(21, 30))));
    }

    #[test]
    fn test_resolve_range_accepts_contiguous_slots_in_any_order() {
        let c = court(SlotDuration::Min60);
        let range = resolve_range(&c, &[t(19, 0), t(18, 0)]).unwrap();
        assert_eq!(range.start, t(18, 0));
        assert_eq!(range.end, t(20, 0));
        assert_eq!(range.slot_count, 2);
        assert!(is_contiguous(&c, &[t(8, 0)]));
    }

    #[test]
    fn test_resolve_range_rejects_gaps_duplicates_and_off_grid() {
        let c = court(SlotDuration::Min60);
        assert!(matches!(resolve_range(&c, &[t(18, 0), t(20, 0)]), Err(AppError::InvalidSlotRange(_))));
        assert!(matches!(resolve_range(&c, &[t(18, 0), t(18, 0)]), Err(AppError::InvalidSlotRange(_))));
        assert!(matches!(resolve_range(&c, &[t(18, 30)]), Err(AppError::InvalidSlotRange(_))));
        assert!(matches!(resolve_range(&c, &[t(7, 0)]), Err(AppError::InvalidSlotRange(_))));
        assert!(matches!(resolve_range(&c, &[t(22, 0)]), Err(AppError::InvalidSlotRange(_))));
        assert!(matches!(resolve_range(&c, &[]), Err(AppError::InvalidSlotRange(_))));
    }

    #[test]
    fn test_conflicts_ignore_cancelled_and_adjacent_bookings() {
        let c = court(SlotDuration::Min60);
        let date = NaiveDate::from_ymd_opt(2031, 3, 10).unwrap();
        let existing = vec![
            booking(&c, date, t(18, 0), t(19, 0), BookingStatus::Pending),
            booking(&c, date, t(20, 0), t(21, 0), BookingStatus::Cancelled),
        ];

        let same = resolve_range(&c, &[t(18, 0)]).unwrap();
        assert_eq!(find_conflicts(&existing, &c.id, date, &same).len(), 1);

        let after = resolve_range(&c, &[t(19, 0)]).unwrap();
        assert!(find_conflicts(&existing, &c.id, date, &after).is_empty());

        let over_cancelled = resolve_range(&c, &[t(20, 0)]).unwrap();
        assert!(ensure_free(&existing, &c.id, date, &over_cancelled).is_ok());

        let spanning = resolve_range(&c, &[t(17, 0), t(18, 0)]).unwrap();
        assert!(matches!(ensure_free(&existing, &c.id, date, &spanning), Err(AppError::SlotConflict(_))));

        let other_day = date.succ_opt().unwrap();
        assert!(find_conflicts(&existing, &c.id, other_day, &same).is_empty());
    }

    #[test]
    fn test_available_slots_excludes_taken_cells() {
        let c = court(SlotDuration::Min60);
        let date = NaiveDate::from_ymd_opt(2031, 3, 10).unwrap();
        let existing = vec![booking(&c, date, t(18, 0), t(20, 0), BookingStatus::AwaitingPayment)];

        let free = available_slots(&c, date, &existing);
        assert_eq!(free.len(), 14 - 2);
        assert!(free.iter().all(|s| s.start_time != t(18, 0) && s.start_time != t(19, 0)));
    }
}
