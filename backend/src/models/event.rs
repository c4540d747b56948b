//! Event logging for replicate auditing.
//!
//! Every significant decision of the registry and the scheduler is logged
//! as an [`Event`]: diagnostics absorbed while building the array, each
//! dispatch, skip, curtailment and deferral, and every change of the active
//! maintenance stream. A replicate can be explained from its log alone.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use om_simulator_core_rs::models::{Event, EventLog};
//!
//! let at = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut log = EventLog::new();
//! log.log(Event::FallbackFailureRate {
//!     at,
//!     component_id: "pto001".to_string(),
//!     rate: 0.2,
//! });
//! assert_eq!(log.events_for_component("pto001").len(), 1);
//! ```

use crate::models::strategy::Strategy;
use crate::scheduler::SchedulerPhase;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Replicate event capturing a decision or a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// No network row matched; the static component rate was used
    FallbackFailureRate {
        at: NaiveDateTime,
        component_id: String,
        rate: f64,
    },

    /// A malformed window disabled one strategy for one component
    MaintenanceDisabled {
        at: NaiveDateTime,
        component_id: String,
        strategy: Strategy,
        reason: String,
    },

    /// Other absorbed per-component input problem
    Diagnostic {
        at: NaiveDateTime,
        component_id: String,
        message: String,
    },

    /// Dynamic-cable double counting removed from an electrical row
    RateCorrected {
        at: NaiveDateTime,
        owner: String,
        before: f64,
        after: f64,
    },

    /// A device id was registered again and ignored
    DuplicateDevice { at: NaiveDateTime, device_id: String },

    /// Corrective rows dropped because condition monitoring covers the pair
    CorrectiveSuperseded {
        at: NaiveDateTime,
        component_id: String,
        mode: usize,
        removed: usize,
    },

    /// Logistics quote from the feasibility pre-check
    FeasibilityQuote {
        at: NaiveDateTime,
        component_id: String,
        mode: usize,
        cost: Option<f64>,
    },

    /// The active maintenance stream changed
    PhaseTransition {
        at: NaiveDateTime,
        from: SchedulerPhase,
        to: SchedulerPhase,
    },

    /// A stream ran out of rows or passed the mission end
    StreamExhausted { at: NaiveDateTime, strategy: Strategy },

    /// Logistics solved and the action was booked
    ActionDispatched {
        at: NaiveDateTime,
        strategy: Strategy,
        action_id: Uuid,
        component_ids: Vec<String>,
        devices: Vec<String>,
        sea_time_hours: f64,
        total_cost: f64,
    },

    /// Row skipped without dispatch
    ActionSkipped {
        at: NaiveDateTime,
        strategy: Strategy,
        component_id: String,
        reason: String,
    },

    /// Logistics found no weather window before the mission end
    NoWeatherWindow {
        at: NaiveDateTime,
        strategy: Strategy,
        component_id: String,
        devices: Vec<String>,
    },

    /// A device was switched off for the rest of the mission
    DeviceCurtailed {
        at: NaiveDateTime,
        strategy: Strategy,
        device_id: String,
    },

    /// A condition alarm was left to an upcoming calendar action
    DeferredToCalendar {
        at: NaiveDateTime,
        component_id: String,
        mode: usize,
        calendar_date: NaiveDateTime,
        lost_energy_value: f64,
        repair_cost: f64,
    },

    /// Later corrective rows of a component moved by the realized sea time
    CorrectiveShifted {
        at: NaiveDateTime,
        component_id: String,
        rows: usize,
        hours: f64,
    },
}

impl Event {
    /// Instant the event refers to
    pub fn at(&self) -> NaiveDateTime {
        match self {
            Event::FallbackFailureRate { at, .. }
            | Event::MaintenanceDisabled { at, .. }
            | Event::Diagnostic { at, .. }
            | Event::RateCorrected { at, .. }
            | Event::DuplicateDevice { at, .. }
            | Event::CorrectiveSuperseded { at, .. }
            | Event::FeasibilityQuote { at, .. }
            | Event::PhaseTransition { at, .. }
            | Event::StreamExhausted { at, .. }
            | Event::ActionDispatched { at, .. }
            | Event::ActionSkipped { at, .. }
            | Event::NoWeatherWindow { at, .. }
            | Event::DeviceCurtailed { at, .. }
            | Event::DeferredToCalendar { at, .. }
            | Event::CorrectiveShifted { at, .. } => *at,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::FallbackFailureRate { .. } => "FallbackFailureRate",
            Event::MaintenanceDisabled { .. } => "MaintenanceDisabled",
            Event::Diagnostic { .. } => "Diagnostic",
            Event::RateCorrected { .. } => "RateCorrected",
            Event::DuplicateDevice { .. } => "DuplicateDevice",
            Event::CorrectiveSuperseded { .. } => "CorrectiveSuperseded",
            Event::FeasibilityQuote { .. } => "FeasibilityQuote",
            Event::PhaseTransition { .. } => "PhaseTransition",
            Event::StreamExhausted { .. } => "StreamExhausted",
            Event::ActionDispatched { .. } => "ActionDispatched",
            Event::ActionSkipped { .. } => "ActionSkipped",
            Event::NoWeatherWindow { .. } => "NoWeatherWindow",
            Event::DeviceCurtailed { .. } => "DeviceCurtailed",
            Event::DeferredToCalendar { .. } => "DeferredToCalendar",
            Event::CorrectiveShifted { .. } => "CorrectiveShifted",
        }
    }

    /// Component the event is about, if any
    pub fn component_id(&self) -> Option<&str> {
        match self {
            Event::FallbackFailureRate { component_id, .. }
            | Event::MaintenanceDisabled { component_id, .. }
            | Event::Diagnostic { component_id, .. }
            | Event::CorrectiveSuperseded { component_id, .. }
            | Event::FeasibilityQuote { component_id, .. }
            | Event::ActionSkipped { component_id, .. }
            | Event::NoWeatherWindow { component_id, .. }
            | Event::DeferredToCalendar { component_id, .. }
            | Event::CorrectiveShifted { component_id, .. } => Some(component_id),
            Event::ActionDispatched { component_ids, .. } => component_ids.first().map(String::as_str),
            _ => None,
        }
    }

    /// Strategy the event belongs to, if any
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Event::MaintenanceDisabled { strategy, .. }
            | Event::StreamExhausted { strategy, .. }
            | Event::ActionDispatched { strategy, .. }
            | Event::ActionSkipped { strategy, .. }
            | Event::NoWeatherWindow { strategy, .. }
            | Event::DeviceCurtailed { strategy, .. } => Some(*strategy),
            Event::CorrectiveSuperseded { .. } => Some(Strategy::Corrective),
            Event::DeferredToCalendar { .. } => Some(Strategy::Condition),
            _ => None,
        }
    }
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Append every event of another log, preserving order
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_component(&self, component_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.component_id() == Some(component_id))
            .collect()
    }

    pub fn events_for_strategy(&self, strategy: Strategy) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.strategy() == Some(strategy))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_event_queries() {
        let mut log = EventLog::new();
        log.log(Event::StreamExhausted { at: at(), strategy: Strategy::Calendar });
        log.log(Event::ActionSkipped {
            at: at(),
            strategy: Strategy::Corrective,
            component_id: "pto001".to_string(),
            reason: "curtailed".to_string(),
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.events_of_type("StreamExhausted").len(), 1);
        assert_eq!(log.events_for_component("pto001").len(), 1);
        assert_eq!(log.events_for_strategy(Strategy::Corrective).len(), 1);
        assert_eq!(log.events()[0].at(), at());
    }
}
