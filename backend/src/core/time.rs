//! Mission calendar
//!
//! The simulation runs on wall-clock dates: failure
//! processes produce dates, logistics answers in dates, and labour cost
//! depends on the day of week, the season and the hour of day.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Hours in a (non-leap) year; failure rates are converted with this constant.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Days in a (non-leap) year.
pub const DAYS_PER_YEAR: f64 = 365.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Start and end instants of one mission.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use om_simulator_core_rs::MissionClock;
///
/// let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
/// let clock = MissionClock::from_days(start, 365);
/// assert_eq!(clock.end().date(), NaiveDate::from_ymd_opt(2016, 12, 31).unwrap());
/// assert_eq!(clock.mission_days(), 365);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionClock {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

/// The part of a mission that falls inside one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSpan {
    pub year: i32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl YearSpan {
    /// Length of the span in hours
    pub fn hours(&self) -> f64 {
        hours_between(self.start, self.end)
    }
}

impl MissionClock {
    /// Mission of `mission_years` calendar years starting at midnight of `start`.
    pub fn new(start: NaiveDate, mission_years: u32) -> Self {
        let end = start
            .checked_add_months(Months::new(12 * mission_years))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(NaiveTime::MIN),
        }
    }

    /// Mission of an explicit number of days.
    pub fn from_days(start: NaiveDate, days: i64) -> Self {
        let start = start.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(days.max(0)),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whole days between start and end
    pub fn mission_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn mission_hours(&self) -> f64 {
        hours_between(self.start, self.end)
    }

    /// True when `instant` lies within `[start, end]`.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Clamp an instant into the mission.
    pub fn clamp(&self, instant: NaiveDateTime) -> NaiveDateTime {
        instant.max(self.start).min(self.end)
    }

    /// Split the mission into calendar-year pieces, in order.
    pub fn year_spans(&self) -> Vec<YearSpan> {
        let mut spans = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            let year = cursor.year();
            let next_year = NaiveDate::from_ymd_opt(year + 1, 1, 1)
                .map(|d| d.and_time(NaiveTime::MIN))
                .unwrap_or(self.end);
            let end = next_year.min(self.end);
            spans.push(YearSpan {
                year,
                start: cursor,
                end,
            });
            cursor = end;
        }
        spans
    }
}

/// Signed number of hours from `from` to `to`.
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Shift an instant by a (possibly fractional) number of hours.
///
/// Saturates at the representable date range instead of overflowing.
pub fn add_hours(instant: NaiveDateTime, hours: f64) -> NaiveDateTime {
    if !hours.is_finite() {
        return instant;
    }
    let saturated = if hours > 0.0 {
        NaiveDateTime::MAX
    } else {
        NaiveDateTime::MIN
    };
    Duration::try_milliseconds((hours * MILLIS_PER_HOUR).round() as i64)
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(saturated)
}

/// Summer season runs March to August inclusive.
pub fn is_summer(instant: NaiveDateTime) -> bool {
    (3..=8).contains(&instant.month())
}

/// Overlap in hours between `[a_start, a_end)` and `[b_start, b_end)`.
pub fn overlap_hours(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> f64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end > start {
        hours_between(start, end)
    } else {
        0.0
    }
}
