//! Local-day windowing and time-label parsing
//!
//! All arithmetic happens in the run's fixed target offset. A calendar row only
//! carries a clock time, so it is anchored to the date of the current instant.

use crate::types::LocalTime;
use chrono::{NaiveDate, NaiveTime};

/// Labels the calendar uses for rows without a clock time
const UNSCHEDULED_LABELS: [&str; 2] = ["all day", "tentative"];

/// Format of a scheduled label, e.g. "8:30am"
const TIME_LABEL_FORMAT: &str = "%I:%M%p";

/// The `[midnight, 23:59:59.999]` window of the run's local day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDay {
    pub start: LocalTime,
    pub end: LocalTime,
}

impl LocalDay {
    /// Compute the window containing `now`, in `now`'s offset
    pub fn containing(now: LocalTime) -> Option<Self> {
        let offset = *now.offset();
        let date = now.date_naive();
        let start = date.and_hms_opt(0, 0, 0)?.and_local_timezone(offset).single()?;
        let end = date
            .and_hms_milli_opt(23, 59, 59, 999)?
            .and_local_timezone(offset)
            .single()?;
        Some(Self { start, end })
    }

    /// The calendar date of this window
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Check if an instant falls inside the window (both ends inclusive)
    pub fn contains(&self, instant: &LocalTime) -> bool {
        self.start <= *instant && *instant <= self.end
    }

    /// Anchor a parsed clock time to this day
    pub fn at(&self, time: NaiveTime) -> Option<LocalTime> {
        self.date()
            .and_time(time)
            .and_local_timezone(*self.start.offset())
            .single()
    }
}

/// Outcome of reading a row's time-of-day label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLabel {
    /// A clock time on the calendar
    Scheduled(NaiveTime),
    /// Empty, "All Day" or "Tentative"
    Unscheduled,
    /// Text that is not a supported clock format
    Malformed,
}

/// Classify and parse a time-of-day label
pub fn parse_time_label(label: &str) -> TimeLabel {
    let label = label.trim();
    if label.is_empty() {
        return TimeLabel::Unscheduled;
    }

    let lower = label.to_lowercase();
    if UNSCHEDULED_LABELS.iter().any(|marker| lower.contains(marker)) {
        return TimeLabel::Unscheduled;
    }

    match NaiveTime::parse_from_str(&label.to_uppercase(), TIME_LABEL_FORMAT) {
        Ok(time) => TimeLabel::Scheduled(time),
        Err(_) => TimeLabel::Malformed,
    }
}

/// Whole minutes from `now` until `scheduled`, rounded, never negative
pub fn minutes_until(scheduled: &LocalTime, now: &LocalTime) -> u32 {
    let seconds = (*scheduled - *now).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    u32::try_from((seconds + 30) / 60).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn taipei() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        let now = taipei().with_ymd_and_hms(2024, 3, 8, 14, 0, 0).unwrap();
        let day = LocalDay::containing(now).unwrap();

        let midnight = taipei().with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        let last_second = taipei().with_ymd_and_hms(2024, 3, 8, 23, 59, 59).unwrap();
        let next_day = taipei().with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        let previous_day = taipei().with_ymd_and_hms(2024, 3, 7, 23, 59, 59).unwrap();

        assert!(day.contains(&midnight));
        assert!(day.contains(&last_second));
        assert!(!day.contains(&next_day));
        assert!(!day.contains(&previous_day));
    }

    #[test]
    fn test_window_at_boundary_instants() {
        for (h, m, s) in [(0, 0, 0), (23, 59, 59)] {
            let now = taipei().with_ymd_and_hms(2024, 3, 8, h, m, s).unwrap();
            let day = LocalDay::containing(now).unwrap();
            assert!(day.contains(&now));
            assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        }
    }

    #[test]
    fn test_parse_time_labels() {
        assert_eq!(
            parse_time_label("8:30am"),
            TimeLabel::Scheduled(NaiveTime::from_hms_opt(8, 30, 0).unwrap())
        );
        assert_eq!(
            parse_time_label(" 12:00pm "),
            TimeLabel::Scheduled(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
        );
        assert_eq!(
            parse_time_label("12:15AM"),
            TimeLabel::Scheduled(NaiveTime::from_hms_opt(0, 15, 0).unwrap())
        );
        assert_eq!(parse_time_label(""), TimeLabel::Unscheduled);
        assert_eq!(parse_time_label("All Day"), TimeLabel::Unscheduled);
        assert_eq!(parse_time_label("Tentative"), TimeLabel::Unscheduled);
        assert_eq!(parse_time_label("Day 2"), TimeLabel::Malformed);
        assert_eq!(parse_time_label("14:30"), TimeLabel::Malformed);
    }

    #[test]
    fn test_minutes_until() {
        let now = taipei().with_ymd_and_hms(2024, 3, 8, 14, 0, 0).unwrap();

        let past = taipei().with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap();
        assert_eq!(minutes_until(&past, &now), 0);
        assert_eq!(minutes_until(&now, &now), 0);

        let soon = taipei().with_ymd_and_hms(2024, 3, 8, 14, 45, 0).unwrap();
        assert_eq!(minutes_until(&soon, &now), 45);

        let later = taipei().with_ymd_and_hms(2024, 3, 8, 16, 5, 0).unwrap();
        assert_eq!(minutes_until(&later, &now), 125);

        // 89 seconds rounds to one minute, 90 seconds to two
        let now_plus_89s = taipei().with_ymd_and_hms(2024, 3, 8, 14, 1, 29).unwrap();
        assert_eq!(minutes_until(&now_plus_89s, &now), 1);
        let now_plus_90s = taipei().with_ymd_and_hms(2024, 3, 8, 14, 1, 30).unwrap();
        assert_eq!(minutes_until(&now_plus_90s, &now), 2);
    }
}
