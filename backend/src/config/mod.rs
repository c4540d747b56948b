//! Simulation configuration and scenario input
//!
//! A scenario is one JSON document: the [`SimulationConfig`] plus every
//! static table the registry needs. Configuration errors are the only hard
//! input failures; per-component data problems are absorbed later by the
//! registry as diagnostics.

use crate::failure::SamplerConfig;
use crate::logistics::{SiteInfo, TabularLogisticsConfig};
use crate::models::component::{
    ComponentRecord, DeviceRecord, FailureModeRecord, InspectionRecord, RepairActionRecord,
};
use crate::models::reliability::ReliabilityOutput;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised while loading or validating a scenario
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config serialization failed: {0}")]
    Serialization(String),
}

/// Hourly wage rates of one crew category.
///
/// Weekend rates default to the corresponding night rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageRates {
    pub day: f64,
    pub night: f64,
    #[serde(default)]
    pub weekend_day: Option<f64>,
    #[serde(default)]
    pub weekend_night: Option<f64>,
}

impl WageRates {
    pub fn weekend_day(&self) -> f64 {
        self.weekend_day.unwrap_or(self.night)
    }

    pub fn weekend_night(&self) -> f64 {
        self.weekend_night.unwrap_or(self.night)
    }
}

/// Farm-wide working pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingWeek {
    /// Working days per week, March to August
    pub summer_days: u32,
    /// Working days per week, September to February
    pub winter_days: u32,
    /// Hour of day the day shift starts (0-23)
    pub shift_start_hour: u32,
    /// Length of the day shift in hours
    pub shift_hours: u32,
}

impl Default for WorkingWeek {
    fn default() -> Self {
        Self {
            summer_days: 5,
            winter_days: 5,
            shift_start_hour: 7,
            shift_hours: 12,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// First day of the mission
    pub start_date: NaiveDate,

    /// Mission length in calendar years
    pub mission_years: u32,

    pub corrective_enabled: bool,
    pub calendar_enabled: bool,
    pub condition_enabled: bool,

    /// Switch devices off permanently when logistics finds no weather window
    pub curtail_devices: bool,

    pub sampler: SamplerConfig,

    /// Base seed; each replicate derives its own
    pub rng_seed: u64,

    /// Most calendar actions bundled into one dispatch
    pub max_parallel_actions: usize,

    /// Preparation time handed to the logistics solver (hours)
    pub prep_time_hours: f64,

    /// How far ahead of a condition alarm a calendar action may absorb it (days)
    pub condition_lookahead_days: i64,

    /// Value of one MWh of lost production
    pub energy_price_per_mwh: f64,

    pub working_week: WorkingWeek,
    pub technician_wages: WageRates,
    pub specialist_wages: WageRates,

    /// Quote every component mode with the solver before the run
    pub feasibility_check: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default(),
            mission_years: 20,
            corrective_enabled: true,
            calendar_enabled: false,
            condition_enabled: false,
            curtail_devices: false,
            sampler: SamplerConfig::default(),
            rng_seed: 12345,
            max_parallel_actions: 10,
            prep_time_hours: 48.0,
            condition_lookahead_days: 30,
            energy_price_per_mwh: 150.0,
            working_week: WorkingWeek::default(),
            technician_wages: WageRates {
                day: 45.0,
                night: 60.0,
                weekend_day: None,
                weekend_night: None,
            },
            specialist_wages: WageRates {
                day: 80.0,
                night: 100.0,
                weekend_day: None,
                weekend_night: None,
            },
            feasibility_check: true,
        }
    }
}

impl SimulationConfig {
    pub fn any_strategy_enabled(&self) -> bool {
        self.corrective_enabled || self.calendar_enabled || self.condition_enabled
    }

    /// Reject values no replicate could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mission_years == 0 {
            return Err(ConfigError::InvalidConfig(
                "mission_years must be > 0".to_string(),
            ));
        }

        if self.sampler.trials == 0 {
            return Err(ConfigError::InvalidConfig(
                "sampler.trials must be > 0".to_string(),
            ));
        }

        let (lo, hi) = (self.sampler.lower_percentile, self.sampler.upper_percentile);
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo > hi {
            return Err(ConfigError::InvalidConfig(format!(
                "percentile band [{}, {}] must satisfy 0 <= lower <= upper <= 100",
                lo, hi
            )));
        }

        if self.max_parallel_actions == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_parallel_actions must be > 0".to_string(),
            ));
        }

        let week = &self.working_week;
        if week.shift_start_hour > 23 {
            return Err(ConfigError::InvalidConfig(format!(
                "shift_start_hour {} must be <= 23",
                week.shift_start_hour
            )));
        }
        if week.shift_hours > 24 {
            return Err(ConfigError::InvalidConfig(format!(
                "shift_hours {} must be <= 24",
                week.shift_hours
            )));
        }
        if week.summer_days > 7 || week.winter_days > 7 {
            return Err(ConfigError::InvalidConfig(
                "working days per week must be <= 7".to_string(),
            ));
        }

        if self.prep_time_hours < 0.0 || self.condition_lookahead_days < 0 {
            return Err(ConfigError::InvalidConfig(
                "prep_time_hours and condition_lookahead_days must be >= 0".to_string(),
            ));
        }

        if self.energy_price_per_mwh < 0.0 {
            return Err(ConfigError::InvalidConfig(
                "energy_price_per_mwh must be >= 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// One complete simulation input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimulationConfig,
    pub components: Vec<ComponentRecord>,
    pub failure_modes: Vec<FailureModeRecord>,
    #[serde(default)]
    pub repair_actions: Vec<RepairActionRecord>,
    #[serde(default)]
    pub inspections: Vec<InspectionRecord>,
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub reliability: ReliabilityOutput,
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default)]
    pub logistics: TabularLogisticsConfig,
}

impl Scenario {
    /// Parse and validate a scenario document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Serialization(e.to_string()))
    }
}

/// SHA-256 of the canonical JSON form (object keys sorted) of `config`.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, ConfigError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| ConfigError::Serialization(e.to_string()))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| ConfigError::Serialization(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
