//! Table-driven logistics solver
//!
//! A deterministic stand-in for a full vessel/port/weather optimiser. Each
//! vessel lists the operations it can perform; the first capable vessel
//! wins. Weather is reduced to the calmest sea state the site ever sees: an
//! action whose limits are below it can never find a window.

use super::{LogisticsOutcome, LogisticsRequest, LogisticsSolution, LogisticsSolver, Operation, VesselUsage};
use crate::core::time::{add_hours, hours_between};
use crate::models::component::MetOceanLimits;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One vessel type available to the farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSpec {
    pub name: String,
    pub vessel_type: String,
    #[serde(default = "default_count")]
    pub count: u32,
    /// Charter cost per vessel per day
    pub day_rate: f64,
    #[serde(default)]
    pub mobilisation_hours: f64,
    pub transit_speed_kmh: f64,
    /// Heaviest spare the vessel can lift, unlimited when absent
    #[serde(default)]
    pub max_lift_kg: Option<f64>,
    pub operations: Vec<Operation>,
}

fn default_count() -> u32 {
    1
}

/// Calmest conditions the site ever offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeaState {
    pub hs_m: f64,
    pub tp_s: f64,
    pub wind_ms: f64,
    pub current_ms: f64,
}

impl SeaState {
    /// True when an action with `limits` can work in this sea state.
    pub fn permits(&self, limits: &MetOceanLimits) -> bool {
        limits.max_hs_m >= self.hs_m
            && limits.max_tp_s >= self.tp_s
            && limits.max_wind_ms >= self.wind_ms
            && limits.max_current_ms >= self.current_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularLogisticsConfig {
    pub vessels: Vec<VesselSpec>,
    #[serde(default)]
    pub calmest: SeaState,
    /// Fixed wait for a weather window before every departure
    #[serde(default)]
    pub weather_delay_hours: f64,
}

impl Default for TabularLogisticsConfig {
    fn default() -> Self {
        Self {
            vessels: vec![VesselSpec {
                name: "Multicat".to_string(),
                vessel_type: "Multicat".to_string(),
                count: 1,
                day_rate: 12_000.0,
                mobilisation_hours: 24.0,
                transit_speed_kmh: 20.0,
                max_lift_kg: None,
                operations: vec![
                    Operation::RepairOnSite,
                    Operation::RepairAtPort,
                    Operation::CableRepair,
                    Operation::InspectionAboveSea,
                    Operation::InspectionSubsea,
                ],
            }],
            calmest: SeaState::default(),
            weather_delay_hours: 0.0,
        }
    }
}

/// Logistics solver backed by [`TabularLogisticsConfig`].
#[derive(Debug, Clone)]
pub struct TabularLogistics {
    config: TabularLogisticsConfig,
    horizon: NaiveDateTime,
    requests: usize,
}

impl TabularLogistics {
    /// Solver whose plans must end by `horizon` (usually the mission end).
    pub fn new(config: TabularLogisticsConfig, horizon: NaiveDateTime) -> Self {
        Self {
            config,
            horizon,
            requests: 0,
        }
    }

    /// Number of requests answered so far
    pub fn requests(&self) -> usize {
        self.requests
    }

    fn vessel_for(&self, request: &LogisticsRequest) -> Option<&VesselSpec> {
        self.config.vessels.iter().find(|v| {
            v.operations.contains(&request.operation)
                && v.max_lift_kg.map_or(true, |max| request.spare.mass_kg <= max)
        })
    }
}

impl LogisticsSolver for TabularLogistics {
    fn solve(&mut self, request: &LogisticsRequest) -> LogisticsOutcome {
        self.requests += 1;

        let Some(vessel) = self.vessel_for(request) else {
            return LogisticsOutcome::NoSolutionsFound;
        };

        let calmest = &self.config.calmest;
        if !calmest.permits(&request.access_limits) || !calmest.permits(&request.work_limits) {
            return LogisticsOutcome::NoWeatherWindowFound;
        }

        let prep = request.prep_time_hours.max(0.0) + vessel.mobilisation_hours.max(0.0);
        let waiting = self.config.weather_delay_hours.max(0.0);
        let departure = add_hours(request.requested, prep + waiting);

        let transit = if vessel.transit_speed_kmh > 0.0 {
            2.0 * request.port_distance_km.max(0.0) / vessel.transit_speed_kmh
        } else {
            0.0
        };
        let sea_time =
            transit + request.access_duration_hours.max(0.0) + request.on_site_duration_hours.max(0.0);
        let end = add_hours(departure, sea_time);

        if hours_between(end, self.horizon) < 0.0 {
            return LogisticsOutcome::NoWeatherWindowFound;
        }

        let charter_hours = vessel.mobilisation_hours.max(0.0) + waiting + sea_time;
        let total_cost = vessel.day_rate * f64::from(vessel.count) * charter_hours / 24.0;

        LogisticsOutcome::SolutionFound(LogisticsSolution {
            vessel: vessel.name.clone(),
            vessels: vec![VesselUsage {
                vessel_type: vessel.vessel_type.clone(),
                count: vessel.count,
                hours: sea_time,
            }],
            departure,
            end,
            prep_time_hours: prep,
            waiting_time_hours: waiting,
            sea_time_hours: sea_time,
            total_cost,
        })
    }
}
