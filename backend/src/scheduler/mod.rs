//! Maintenance scheduler
//!
//! The core loop of a replicate. Three event streams compete:
//!
//! - **UnCoMa** (corrective): realized failures, by request date
//! - **CaBaMa** (calendar): recurring maintenance windows, by opening date
//! - **CoBaMa** (condition): degradation alarms, by alarm date
//!
//! Exactly one stream is active at a time. Each step advances the stream
//! whose next row is due first, dispatches it to the logistics solver and
//! books cost, downtime and energy loss into the array state. A stream is
//! exhausted when its cursor reaches the end of its table or its next row
//! lies beyond the mission end; the scheduler is done when all are.
//!
//! # Critical Invariants
//!
//! 1. **Single writer**: only the scheduler mutates the array state
//! 2. **Monotonic processing**: each table is sorted once and its cursor
//!    only moves forward
//! 3. **Monotonic repairs**: within one strategy, repair dates never
//!    decrease in processing order
//! 4. **Fatal no-solution**: `NoSolutionsFound` aborts the replicate

mod engine;
pub mod tables;

pub use engine::{MaintenanceScheduler, SchedulerOutcome, SchedulerTables};

use crate::models::strategy::{PerStrategy, Strategy};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that abort a replicate
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("No logistics solution for {component_id} ({strategy}) requested at {requested}")]
    NoSolutionsFound {
        strategy: Strategy,
        component_id: String,
        requested: NaiveDateTime,
    },

    #[error("Component {component_id} of the {strategy} table is not registered")]
    UnknownComponent {
        strategy: Strategy,
        component_id: String,
    },
}

/// Active stream of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    RunningCorrective,
    RunningCalendar,
    RunningCondition,
    Done,
}

impl SchedulerPhase {
    pub fn running(strategy: Strategy) -> SchedulerPhase {
        match strategy {
            Strategy::Corrective => SchedulerPhase::RunningCorrective,
            Strategy::Calendar => SchedulerPhase::RunningCalendar,
            Strategy::Condition => SchedulerPhase::RunningCondition,
        }
    }

    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            SchedulerPhase::RunningCorrective => Some(Strategy::Corrective),
            SchedulerPhase::RunningCalendar => Some(Strategy::Calendar),
            SchedulerPhase::RunningCondition => Some(Strategy::Condition),
            SchedulerPhase::Done => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, SchedulerPhase::Done)
    }
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy() {
            Some(s) => write!(f, "Running{}", s.label()),
            None => f.write_str("Done"),
        }
    }
}

/// Loop state threaded through every [`MaintenanceScheduler::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerState {
    pub phase: SchedulerPhase,
    /// Next unprocessed row of each table
    pub cursors: PerStrategy<usize>,
    pub exhausted: PerStrategy<bool>,
    /// Latest repair date booked per strategy
    pub last_repair: PerStrategy<Option<NaiveDateTime>>,
    /// Sum over corrective actions of the hours from failure to repair
    pub total_action_delay_hours: f64,
    /// Devices switched off after a missing weather window
    pub turned_off_devices: usize,
    /// Dispatched actions per strategy (a calendar batch counts once)
    pub dispatched: PerStrategy<usize>,
}

impl SchedulerState {
    /// Fresh state; the first active stream follows the priority
    /// calendar, corrective, condition among the enabled ones.
    pub fn new(enabled: &PerStrategy<bool>) -> Self {
        let phase = [Strategy::Calendar, Strategy::Corrective, Strategy::Condition]
            .into_iter()
            .find(|s| enabled[*s])
            .map(SchedulerPhase::running)
            .unwrap_or(SchedulerPhase::Done);
        Self {
            phase,
            cursors: PerStrategy::default(),
            exhausted: PerStrategy::new(
                !enabled.corrective,
                !enabled.calendar,
                !enabled.condition,
            ),
            last_repair: PerStrategy::default(),
            total_action_delay_hours: 0.0,
            turned_off_devices: 0,
            dispatched: PerStrategy::default(),
        }
    }
}
