//! Event tables of the three strategies and the output records
//!
//! Each input table is ordered by its priority date once; the scheduler
//! then only ever advances a cursor over it.

use crate::models::component::{ComponentId, ComponentKind, DeviceId, Owner};
use crate::models::strategy::Strategy;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity fields shared by every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub component_id: ComponentId,
    pub kind: ComponentKind,
    pub subtype: String,
    pub owner: Owner,
}

/// Unplanned corrective (UnCoMa) row: one realized failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectiveEvent {
    pub component: ComponentRef,
    pub mode: usize,
    /// Mode failure rate (1/year)
    pub failure_rate: f64,
    pub failure_date: NaiveDateTime,
    /// Failure date shifted by crew, organisation and spare delays
    pub request_date: NaiveDateTime,
}

/// Calendar-based (CaBaMa) row: one scheduled occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub component: ComponentRef,
    pub mode: usize,
    pub failure_rate: f64,
    /// Opening of the maintenance window
    pub start_date: NaiveDateTime,
    /// Closing of the maintenance window
    pub end_date: NaiveDateTime,
    /// Actual start/end once executed
    pub action_start: Option<NaiveDateTime>,
    pub action_end: Option<NaiveDateTime>,
    pub logistic_cost: Option<f64>,
    pub om_cost: Option<f64>,
}

/// Condition-based (CoBaMa) row: the next alarm of one component mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEvent {
    pub component: ComponentRef,
    pub mode: usize,
    pub failure_rate: f64,
    pub soh_threshold_pct: f64,
    /// Last time the component was renewed (mission start initially)
    pub renewal_date: NaiveDateTime,
    /// Instant the health crosses the threshold
    pub alarm_date: NaiveDateTime,
    /// An upcoming calendar action pre-empts this alarm
    pub preempted_by_calendar: bool,
}

/// One output row: one dispatched action seen from one affected device.
///
/// Rows of the same action share `action_id` and carry the full action
/// costs; aggregate by action, not by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub action_id: Uuid,
    pub strategy: Strategy,
    pub device_id: DeviceId,
    pub affected_devices: Vec<DeviceId>,
    pub component_id: ComponentId,
    pub component_subtype: String,
    pub mode: usize,
    pub failure_rate: f64,
    /// Failure (UnCoMa), window opening (CaBaMa) or alarm (CoBaMa) date
    pub failure_date: NaiveDateTime,
    pub request_date: NaiveDateTime,
    pub repair_date: NaiveDateTime,
    pub downtime_hours: f64,
    pub sea_time_hours: f64,
    pub waiting_time_hours: f64,
    pub cost_logistic: f64,
    pub cost_labour: f64,
    pub cost_spare: f64,
    pub vessel: String,
}

impl MaintenanceRecord {
    pub fn total_cost(&self) -> f64 {
        self.cost_logistic + self.cost_labour + self.cost_spare
    }
}

/// The three output tables of a replicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputTables {
    pub corrective: Vec<MaintenanceRecord>,
    pub calendar: Vec<MaintenanceRecord>,
    pub condition: Vec<MaintenanceRecord>,
}

impl OutputTables {
    pub fn table(&self, strategy: Strategy) -> &[MaintenanceRecord] {
        match strategy {
            Strategy::Corrective => &self.corrective,
            Strategy::Calendar => &self.calendar,
            Strategy::Condition => &self.condition,
        }
    }

    pub fn table_mut(&mut self, strategy: Strategy) -> &mut Vec<MaintenanceRecord> {
        match strategy {
            Strategy::Corrective => &mut self.corrective,
            Strategy::Calendar => &mut self.calendar,
            Strategy::Condition => &mut self.condition,
        }
    }

    /// All rows, corrective first
    pub fn all(&self) -> impl Iterator<Item = &MaintenanceRecord> {
        self.corrective
            .iter()
            .chain(self.calendar.iter())
            .chain(self.condition.iter())
    }
}
