//! Availability, energy and OPEX aggregation
//!
//! Runs once at the end of a replicate and only reads committed state:
//! per-device merged downtime becomes availability, realized energy comes
//! from the per-year energy finalisation, and OPEX sums every dispatched
//! action once, by action id, in the year of its repair date.

use crate::core::time::{MissionClock, HOURS_PER_YEAR};
use crate::models::strategy::{PerStrategy, Strategy};
use crate::models::tables::MaintenanceRecord;
use crate::scheduler::SchedulerOutcome;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Availability and yield of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAvailability {
    pub device_id: String,
    /// Merged (overlap-free) downtime within the mission
    pub downtime_hours: f64,
    pub availability: f64,
    pub expected_energy_mwh: f64,
    pub realized_energy_mwh: f64,
}

/// Cost and activity of one strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    /// Distinct actions
    pub actions: usize,
    /// Output rows (one per affected device)
    pub records: usize,
    pub cost_logistic: f64,
    pub cost_labour: f64,
    pub cost_spare: f64,
    pub cost_total: f64,
}

/// Outcome of one replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSummary {
    pub seed: u64,
    pub config_hash: String,
    pub mission_start: NaiveDateTime,
    pub mission_end: NaiveDateTime,
    pub devices: Vec<DeviceAvailability>,
    /// Energy-weighted mean of device availabilities
    pub array_availability: f64,
    pub expected_energy_per_year: BTreeMap<i32, f64>,
    pub energy_per_year: BTreeMap<i32, f64>,
    pub opex_per_year: BTreeMap<i32, f64>,
    pub strategies: PerStrategy<StrategySummary>,
    pub turned_off_devices: usize,
    pub environmental_records: usize,
    pub events_logged: usize,
}

impl ReplicateSummary {
    pub fn total_opex(&self) -> f64 {
        self.opex_per_year.values().sum()
    }

    pub fn total_energy_mwh(&self) -> f64 {
        self.energy_per_year.values().sum()
    }
}

/// Post-run reducer turning a scheduler outcome into a summary.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityEnergyAggregator {
    clock: MissionClock,
}

impl AvailabilityEnergyAggregator {
    pub fn new(clock: MissionClock) -> Self {
        Self { clock }
    }

    pub fn aggregate(&self, outcome: &SchedulerOutcome, seed: u64, config_hash: String) -> ReplicateSummary {
        let mission_hours = self.clock.mission_hours();
        let spans = self.clock.year_spans();

        let mut devices = Vec::new();
        let mut expected_energy_per_year: BTreeMap<i32, f64> = BTreeMap::new();
        let mut energy_per_year: BTreeMap<i32, f64> = BTreeMap::new();

        for device in outcome.array.devices() {
            let downtime = device.merged_downtime_hours(&self.clock);
            let availability = if mission_hours > 0.0 {
                (1.0 - downtime / mission_hours).clamp(0.0, 1.0)
            } else {
                1.0
            };

            let mut expected = 0.0;
            for span in &spans {
                let e = device.annual_energy_mwh * span.hours() / HOURS_PER_YEAR;
                *expected_energy_per_year.entry(span.year).or_default() += e;
                expected += e;
            }
            for (year, energy) in &device.realized_energy_mwh {
                *energy_per_year.entry(*year).or_default() += energy;
            }

            devices.push(DeviceAvailability {
                device_id: device.device_id.clone(),
                downtime_hours: downtime,
                availability,
                expected_energy_mwh: expected,
                realized_energy_mwh: device.realized_energy_mwh.values().sum(),
            });
        }

        let mut strategies: PerStrategy<StrategySummary> = PerStrategy::default();
        let mut opex_per_year: BTreeMap<i32, f64> = spans.iter().map(|s| (s.year, 0.0)).collect();
        for strategy in Strategy::ALL {
            strategies[strategy] =
                summarize(outcome.outputs.table(strategy), &mut opex_per_year);
        }

        ReplicateSummary {
            seed,
            config_hash,
            mission_start: self.clock.start(),
            mission_end: self.clock.end(),
            array_availability: array_availability(&devices),
            devices,
            expected_energy_per_year,
            energy_per_year,
            opex_per_year,
            strategies,
            turned_off_devices: outcome.state.turned_off_devices,
            environmental_records: outcome.environmental.len(),
            events_logged: outcome.log.len(),
        }
    }
}

fn summarize(records: &[MaintenanceRecord], opex_per_year: &mut BTreeMap<i32, f64>) -> StrategySummary {
    let mut summary = StrategySummary {
        records: records.len(),
        ..StrategySummary::default()
    };
    let mut seen = BTreeSet::new();
    for record in records {
        if !seen.insert(record.action_id) {
            continue;
        }
        summary.actions += 1;
        summary.cost_logistic += record.cost_logistic;
        summary.cost_labour += record.cost_labour;
        summary.cost_spare += record.cost_spare;
        summary.cost_total += record.total_cost();
        *opex_per_year.entry(record.repair_date.year()).or_default() += record.total_cost();
    }
    summary
}

/// Energy-weighted availability; plain mean when no device has a yield.
fn array_availability(devices: &[DeviceAvailability]) -> f64 {
    if devices.is_empty() {
        return 1.0;
    }
    let weight: f64 = devices.iter().map(|d| d.expected_energy_mwh).sum();
    if weight > 0.0 {
        devices
            .iter()
            .map(|d| d.availability * d.expected_energy_mwh)
            .sum::<f64>()
            / weight
    } else {
        devices.iter().map(|d| d.availability).sum::<f64>() / devices.len() as f64
    }
}
