//! Calendar and condition event tables
//!
//! Built once per replicate from the component catalog. Calendar rows are
//! ordered by window opening, condition rows by alarm date.

use crate::core::time::{add_hours, hours_between, MissionClock, DAYS_PER_YEAR};
use crate::models::event::{Event, EventLog};
use crate::models::tables::{CalendarEvent, ConditionEvent};
use crate::registry::ComponentCatalog;
use crate::rng::RngManager;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar occurrences of every component with a calendar window.
///
/// One row per component and occurrence, every `interval_years` from the
/// mission start year. A window opens on the first day of `start_month`
/// and closes at the end of `end_month`, wrapping into the next year when
/// `end_month < start_month`. Occurrences opening outside the mission are
/// dropped. Components without an inspection record are skipped.
pub fn calendar_table(
    catalog: &ComponentCatalog,
    clock: &MissionClock,
    log: &mut EventLog,
) -> Vec<CalendarEvent> {
    let mut rows = Vec::new();
    let first_year = clock.start().year();
    let last_year = clock.end().year();

    for profile in catalog.profiles() {
        let Some(window) = profile.calendar else {
            continue;
        };
        let Some(mode) = profile.inspections.keys().next().copied() else {
            log.log(Event::Diagnostic {
                at: clock.start(),
                component_id: profile.id().to_string(),
                message: "calendar window without inspection record; calendar disabled".to_string(),
            });
            continue;
        };

        let step = window.interval_years.max(1) as usize;
        for year in (first_year..=last_year).step_by(step) {
            let Some(start) = month_start(year, window.start_month) else {
                continue;
            };
            let end_year = if window.end_month < window.start_month { year + 1 } else { year };
            let Some(end) = month_end(end_year, window.end_month) else {
                continue;
            };
            if start < clock.start() || start >= clock.end() {
                continue;
            }
            rows.push(CalendarEvent {
                component: profile.reference.clone(),
                mode,
                failure_rate: profile.failure_rate,
                start_date: start,
                end_date: end,
                action_start: None,
                action_end: None,
                logistic_cost: None,
                om_cost: None,
            });
        }
    }

    rows.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.component.component_id.cmp(&b.component.component_id))
    });
    rows
}

/// First condition alarm of every monitored component mode.
///
/// A mode is monitored when its component has a condition window and the
/// mode has a repair action.
pub fn condition_table(
    catalog: &ComponentCatalog,
    clock: &MissionClock,
    rng: &mut RngManager,
) -> Vec<ConditionEvent> {
    let mut rows = Vec::new();
    for profile in catalog.profiles() {
        let Some(window) = profile.condition else {
            continue;
        };
        for mode in &profile.modes {
            if profile.repair(mode.mode).is_none() {
                continue;
            }
            let rate = profile.mode_failure_rate(mode);
            let renewal = clock.start();
            rows.push(ConditionEvent {
                component: profile.reference.clone(),
                mode: mode.mode,
                failure_rate: rate,
                soh_threshold_pct: window.soh_threshold_pct,
                renewal_date: renewal,
                alarm_date: next_alarm(renewal, rate, window.soh_threshold_pct, clock, rng),
                preempted_by_calendar: false,
            });
        }
    }
    rows.sort_by(|a, b| {
        a.alarm_date
            .cmp(&b.alarm_date)
            .then_with(|| a.component.component_id.cmp(&b.component.component_id))
            .then(a.mode.cmp(&b.mode))
    });
    rows
}

/// Alarm instant after a renewal at `renewal`.
///
/// Time to failure is exponential in the mode's daily rate; the alarm fires
/// once the remaining health drops to the threshold, i.e. after
/// `t_fail * (1 - threshold / 100)`, and never sooner than one hour. A zero
/// rate puts the alarm one day past the mission end.
pub fn next_alarm(
    renewal: NaiveDateTime,
    annual_rate: f64,
    soh_threshold_pct: f64,
    clock: &MissionClock,
    rng: &mut RngManager,
) -> NaiveDateTime {
    let cap = hours_between(renewal, clock.end()).max(0.0) + 24.0;
    let fail_days = rng.exponential(annual_rate / DAYS_PER_YEAR);
    let hours = fail_days * 24.0 * (1.0 - soh_threshold_pct / 100.0);
    let hours = if hours.is_finite() { hours.clamp(1.0, cap) } else { cap };
    add_hours(renewal, hours)
}

/// Move `instant` to the next opening of a month window if it falls outside.
pub fn shift_into_window(instant: NaiveDateTime, (start_month, end_month): (u32, u32)) -> NaiveDateTime {
    if month_in_window(instant.month(), start_month, end_month) {
        return instant;
    }
    let year = instant.year();
    let candidate = month_start(year, start_month);
    match candidate {
        Some(opening) if opening > instant => opening,
        _ => month_start(year + 1, start_month).unwrap_or(instant),
    }
}

fn month_in_window(month: u32, start_month: u32, end_month: u32) -> bool {
    if start_month <= end_month {
        (start_month..=end_month).contains(&month)
    } else {
        month >= start_month || month <= end_month
    }
}

fn month_start(year: i32, month: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.and_time(NaiveTime::MIN))
}

/// Last instant of the month (midnight of its last day).
fn month_end(year: i32, month: u32) -> Option<NaiveDateTime> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    next.pred_opt().map(|d| d.and_time(NaiveTime::MIN))
}
