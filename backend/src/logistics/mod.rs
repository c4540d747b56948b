//! Logistics collaborator interface
//!
//! The scheduler never chooses vessels itself. For every due action it builds
//! a [`LogisticsRequest`] and hands it to a [`LogisticsSolver`], which answers
//! synchronously with one of three outcomes:
//!
//! 1. **SolutionFound**: a timed, costed vessel plan
//! 2. **NoWeatherWindowFound**: nothing fits before the end of the mission
//! 3. **NoSolutionsFound**: no vessel/equipment/port combination can do the
//!    job at all; fatal for the replicate
//!
//! # Solver Interface
//!
//! ```rust
//! use om_simulator_core_rs::logistics::{LogisticsOutcome, LogisticsRequest, LogisticsSolver};
//!
//! struct NeverAvailable;
//!
//! impl LogisticsSolver for NeverAvailable {
//!     fn solve(&mut self, _request: &LogisticsRequest) -> LogisticsOutcome {
//!         LogisticsOutcome::NoWeatherWindowFound
//!     }
//! }
//! ```

mod tabular;

pub use tabular::{SeaState, TabularLogistics, TabularLogisticsConfig, VesselSpec};

use crate::models::component::{ActionRecord, ComponentKind, MetOceanLimits, SpareSpec};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Kind of marine operation a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    /// Repair carried out at the device position
    RepairOnSite,
    /// Device towed to port and repaired there
    RepairAtPort,
    /// Cable lifted, repaired and re-laid
    CableRepair,
    /// Visual inspection above the water line
    InspectionAboveSea,
    /// Diver or ROV inspection
    InspectionSubsea,
}

impl Operation {
    /// Operation type for an action on a component of `kind`.
    pub fn classify(kind: ComponentKind, action: &ActionRecord, inspection: bool) -> Operation {
        if inspection {
            return if action.requires_divers {
                Operation::InspectionSubsea
            } else {
                Operation::InspectionAboveSea
            };
        }
        if action.requires_towing {
            return Operation::RepairAtPort;
        }
        match kind {
            ComponentKind::DynamicCable | ComponentKind::ArrayCable | ComponentKind::ExportCable => {
                Operation::CableRepair
            }
            _ => Operation::RepairOnSite,
        }
    }
}

/// Site-wide data every request carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub port_distance_km: f64,
    #[serde(default)]
    pub port_index: usize,
    #[serde(default)]
    pub helideck_available: bool,
    /// Site bathymetry (m); device depth is used when absent
    #[serde(default)]
    pub bathymetry_m: Option<f64>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            port_distance_km: 50.0,
            port_index: 0,
            helideck_available: false,
            bathymetry_m: None,
        }
    }
}

/// Physical size of the spare to be shipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpareDimensions {
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub mass_kg: f64,
}

impl From<&SpareSpec> for SpareDimensions {
    fn from(spare: &SpareSpec) -> Self {
        Self {
            length_m: spare.length_m,
            width_m: spare.width_m,
            height_m: spare.height_m,
            mass_kg: spare.mass_kg,
        }
    }
}

/// Everything the solver needs to plan one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticsRequest {
    pub component_id: String,
    pub mode: usize,
    pub operation: Operation,
    pub component_kind: ComponentKind,
    pub component_subtype: String,
    pub depth_m: f64,
    pub x: f64,
    pub y: f64,
    pub zone: String,
    pub soil_type: String,
    pub bathymetry_m: f64,
    /// Earliest instant the action may start
    pub requested: NaiveDateTime,
    pub access_duration_hours: f64,
    pub on_site_duration_hours: f64,
    pub helideck_available: bool,
    pub access_limits: MetOceanLimits,
    pub work_limits: MetOceanLimits,
    pub technicians: u32,
    pub spare: SpareDimensions,
    pub port_distance_km: f64,
    pub port_index: usize,
    pub prep_time_hours: f64,
}

/// Vessel usage reported with a solution, for environmental export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselUsage {
    pub vessel_type: String,
    pub count: u32,
    pub hours: f64,
}

/// A timed, costed transport plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticsSolution {
    /// Name of the main vessel
    pub vessel: String,
    pub vessels: Vec<VesselUsage>,
    pub departure: NaiveDateTime,
    pub end: NaiveDateTime,
    pub prep_time_hours: f64,
    pub waiting_time_hours: f64,
    pub sea_time_hours: f64,
    pub total_cost: f64,
}

/// Answer of the logistics collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum LogisticsOutcome {
    SolutionFound(LogisticsSolution),
    NoWeatherWindowFound,
    NoSolutionsFound,
}

impl LogisticsOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            LogisticsOutcome::SolutionFound(_) => "SolutionFound",
            LogisticsOutcome::NoWeatherWindowFound => "NoWeatherWindowFound",
            LogisticsOutcome::NoSolutionsFound => "NoSolutionsFound",
        }
    }
}

/// Synchronous logistics planner.
///
/// Called once per dispatch; never retried by the scheduler.
pub trait LogisticsSolver {
    fn solve(&mut self, request: &LogisticsRequest) -> LogisticsOutcome;
}

impl<S: LogisticsSolver + ?Sized> LogisticsSolver for Box<S> {
    fn solve(&mut self, request: &LogisticsRequest) -> LogisticsOutcome {
        (**self).solve(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action() -> ActionRecord {
        ActionRecord {
            component_id: "c".to_string(),
            mode: 1,
            duration_maintenance_hours: 4.0,
            duration_access_hours: 1.0,
            delay_crew_hours: 0.0,
            delay_organisation_hours: 0.0,
            technicians: 2,
            specialists: 0,
            access_limits: MetOceanLimits::default(),
            work_limits: MetOceanLimits::default(),
            requires_lifting: false,
            requires_divers: true,
            requires_towing: false,
        }
    }

    #[test]
    fn test_operation_classification() {
        let a = action();
        assert_eq!(Operation::classify(ComponentKind::Pto, &a, true), Operation::InspectionSubsea);
        assert_eq!(Operation::classify(ComponentKind::Pto, &a, false), Operation::RepairOnSite);
        assert_eq!(
            Operation::classify(ComponentKind::ExportCable, &a, false),
            Operation::CableRepair
        );

        let towed = ActionRecord { requires_towing: true, ..a };
        assert_eq!(Operation::classify(ComponentKind::Pto, &towed, false), Operation::RepairAtPort);
    }
}
