//! Bookable-slot derivation for a single date.
//!
//! Everything here is pure: windows, booked times and the current instant
//! go in, an ordered list of 30-minute slots with availability flags comes
//! out. Misconfigured windows produce nothing rather than an error.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike};
use tracing::{debug, warn};

use crate::models::{
    AvailabilityWindow, BookedSlot, DaySchedule, DayOfWeek, SlotView, TimeSlot, Unavailability,
};

pub const SLOT_MINUTES: u32 = 30;
pub const LOOKAHEAD_MINUTES: i64 = 30;

const SLOT_SECONDS: u32 = SLOT_MINUTES * 60;
const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Rounds up to the next slot boundary; aligned times come back unchanged.
/// Returns `None` when rounding would run past midnight.
pub fn align_up(time: NaiveTime) -> Option<NaiveTime> {
    let mut secs = time.num_seconds_from_midnight();
    if time.nanosecond() > 0 {
        secs += 1;
    }
    let aligned = secs.div_ceil(SLOT_SECONDS) * SLOT_SECONDS;
    if aligned >= SECONDS_PER_DAY {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(aligned, 0)
}

/// Slot starts inside one window. The last start is `end - 30min`; a
/// trailing partial interval yields nothing.
pub fn window_candidates(window: &AvailabilityWindow) -> Vec<NaiveTime> {
    if window.end_time <= window.start_time {
        debug!(
            "Skipping misconfigured {} window {}-{}",
            window.day_of_week, window.start_time, window.end_time
        );
        return Vec::new();
    }

    let Some(first) = align_up(window.start_time) else {
        return Vec::new();
    };

    let end = window.end_time.num_seconds_from_midnight();
    let mut candidates = Vec::new();
    let mut current = first.num_seconds_from_midnight();

    while current + SLOT_SECONDS <= end {
        if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(current, 0) {
            candidates.push(time);
        }
        current += SLOT_SECONDS;
    }

    candidates
}

/// Union of every matching window's candidates, deduplicated and ascending.
pub fn candidates_for_date(windows: &[AvailabilityWindow], date: NaiveDate) -> Vec<NaiveTime> {
    let day = DayOfWeek::from(date.weekday());

    windows
        .iter()
        .filter(|w| w.day_of_week == day)
        .flat_map(window_candidates)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn booked_times(booked: &[BookedSlot]) -> HashSet<NaiveTime> {
    booked
        .iter()
        .filter_map(|slot| {
            let parsed = slot.parsed_time();
            if parsed.is_none() {
                warn!("Ignoring booked slot with unreadable time '{}'", slot.time);
            }
            parsed
        })
        .collect()
}

/// Builds the rendered slot list for `date`.
///
/// `now` must already be expressed in the schedule's offset. Same-day slots
/// starting before `now + 30min` are marked elapsed; later dates are only
/// filtered against the booked set. Dates before today are all elapsed.
pub fn compute_day_schedule(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    booked: &[BookedSlot],
    now: DateTime<FixedOffset>,
) -> DaySchedule {
    let taken = booked_times(booked);
    let now_local = now.naive_local();
    let today = now_local.date();
    let cutoff = now_local + Duration::minutes(LOOKAHEAD_MINUTES);

    let slots = candidates_for_date(windows, date)
        .into_iter()
        .map(|time| {
            let reason = if taken.contains(&time) {
                Some(Unavailability::Booked)
            } else if date < today || (date == today && date.and_time(time) < cutoff) {
                Some(Unavailability::Elapsed)
            } else {
                None
            };

            SlotView {
                time: TimeSlot::new(time),
                available: reason.is_none(),
                reason,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "{} slots for {} ({} available)",
        slots.len(),
        date,
        slots.iter().filter(|s| s.available).count()
    );

    DaySchedule {
        date,
        utc_offset: now.offset().to_string(),
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(raw: &str) -> NaiveTime {
        crate::models::hms::parse(raw).unwrap()
    }

    fn window(day: DayOfWeek, start: &str, end: &str) -> AvailabilityWindow {
        AvailabilityWindow {
            day_of_week: day,
            start_time: t(start),
            end_time: t(end),
        }
    }

    fn booked(time: &str) -> BookedSlot {
        BookedSlot {
            time: time.to_string(),
            status: "confirmed".to_string(),
        }
    }

    // 2030-01-07 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn at(date: NaiveDate, time: &str) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&date.and_time(t(time)))
            .single()
            .unwrap()
    }

    fn times(schedule: &DaySchedule) -> Vec<String> {
        schedule.slots.iter().map(|s| s.time.to_string()).collect()
    }

    fn available(schedule: &DaySchedule) -> Vec<String> {
        schedule.available_slots().map(|s| s.time.to_string()).collect()
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(t("08:00")), Some(t("08:00")));
        assert_eq!(align_up(t("08:10")), Some(t("08:30")));
        assert_eq!(align_up(t("08:30:01")), Some(t("09:00")));
        assert_eq!(align_up(t("23:45")), None);
    }

    #[test]
    fn test_candidate_count_matches_duration() {
        for (start, end, expected) in [("08:00", "10:00", 4), ("09:00", "09:30", 1), ("00:00", "23:30", 47)] {
            let candidates = window_candidates(&window(DayOfWeek::Monday, start, end));
            assert_eq!(candidates.len(), expected, "{}-{}", start, end);
        }
    }

    #[test]
    fn test_candidates_stay_inside_window() {
        let w = window(DayOfWeek::Monday, "08:10", "12:00");
        let candidates = window_candidates(&w);

        assert_eq!(candidates.first(), Some(&t("08:30")));
        for c in &candidates {
            assert!(*c >= w.start_time);
            assert!(*c + Duration::minutes(30) <= w.end_time);
            assert_eq!(c.minute() % 30, 0);
        }
    }

    #[test]
    fn test_inverted_or_empty_window_yields_nothing() {
        assert!(window_candidates(&window(DayOfWeek::Monday, "10:00", "09:00")).is_empty());
        assert!(window_candidates(&window(DayOfWeek::Monday, "10:00", "10:00")).is_empty());
    }

    #[test]
    fn test_partial_trailing_interval_dropped() {
        let candidates = window_candidates(&window(DayOfWeek::Monday, "09:00", "09:45"));
        assert_eq!(candidates, vec![t("09:00")]);
    }

    #[test]
    fn test_disjoint_windows_concatenate() {
        let morning = window(DayOfWeek::Monday, "08:00", "09:00");
        let afternoon = window(DayOfWeek::Monday, "14:00", "15:00");

        let merged = candidates_for_date(&[afternoon.clone(), morning.clone()], monday());

        let mut expected = window_candidates(&morning);
        expected.extend(window_candidates(&afternoon));
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_overlapping_windows_deduplicate() {
        let merged = candidates_for_date(
            &[
                window(DayOfWeek::Monday, "08:00", "10:00"),
                window(DayOfWeek::Monday, "09:00", "11:00"),
            ],
            monday(),
        );

        assert_eq!(merged, vec![t("08:00"), t("08:30"), t("09:00"), t("09:30"), t("10:00"), t("10:30")]);
    }

    #[test]
    fn test_other_weekdays_ignored() {
        let merged = candidates_for_date(
            &[
                window(DayOfWeek::Tuesday, "08:00", "10:00"),
                window(DayOfWeek::Monday, "12:00", "13:00"),
            ],
            monday(),
        );

        assert_eq!(merged, vec![t("12:00"), t("12:30")]);
    }

    #[test]
    fn test_booked_slot_marked_unavailable() {
        let schedule = compute_day_schedule(
            &[window(DayOfWeek::Monday, "08:00:00", "10:00:00")],
            monday(),
            &[booked("09:00:00")],
            at(monday() - Duration::days(3), "12:00"),
        );

        assert_eq!(times(&schedule), vec!["08:00", "08:30", "09:00", "09:30"]);
        assert_eq!(available(&schedule), vec!["08:00", "08:30", "09:30"]);
        assert_eq!(schedule.slots[2].reason, Some(Unavailability::Booked));
    }

    #[test]
    fn test_same_day_lookahead_boundary() {
        let schedule = compute_day_schedule(
            &[window(DayOfWeek::Monday, "14:00", "15:00")],
            monday(),
            &[],
            at(monday(), "14:20"),
        );

        assert_eq!(times(&schedule), vec!["14:00", "14:30"]);
        assert!(available(&schedule).is_empty());
        assert!(schedule.slots.iter().all(|s| s.reason == Some(Unavailability::Elapsed)));
    }

    #[test]
    fn test_same_day_slot_at_cutoff_is_available() {
        let schedule = compute_day_schedule(
            &[window(DayOfWeek::Monday, "14:00", "16:00")],
            monday(),
            &[],
            at(monday(), "14:00"),
        );

        assert_eq!(available(&schedule), vec!["14:30", "15:00", "15:30"]);
    }

    #[test]
    fn test_future_date_only_filters_booked() {
        // late evening the day before: a naive datetime cutoff would spill over midnight
        let schedule = compute_day_schedule(
            &[window(DayOfWeek::Monday, "00:00", "01:00")],
            monday(),
            &[booked("00:30")],
            at(monday() - Duration::days(1), "23:50"),
        );

        assert_eq!(available(&schedule), vec!["00:00"]);
    }

    #[test]
    fn test_past_date_all_elapsed() {
        let schedule = compute_day_schedule(
            &[window(DayOfWeek::Monday, "08:00", "09:00")],
            monday(),
            &[],
            at(monday() + Duration::days(1), "08:00"),
        );

        assert_eq!(schedule.slots.len(), 2);
        assert!(available(&schedule).is_empty());
    }

    #[test]
    fn test_unreadable_booked_time_ignored() {
        let schedule = compute_day_schedule(
            &[window(DayOfWeek::Monday, "08:00", "09:00")],
            monday(),
            &[booked("soon"), booked("08:30")],
            at(monday() - Duration::days(1), "08:00"),
        );

        assert_eq!(available(&schedule), vec!["08:00"]);
    }

    #[test]
    fn test_empty_windows_yield_empty_schedule() {
        let schedule = compute_day_schedule(&[], monday(), &[], at(monday(), "08:00"));

        assert!(schedule.slots.is_empty());
        assert_eq!(schedule.utc_offset, "+00:00");
    }
}
