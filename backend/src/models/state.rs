//! Array state
//!
//! Per-component and per-device accumulators for one replicate. Created by
//! the registry, mutated only by the scheduler, read by the aggregator.
//!
//! # Critical Invariants
//!
//! 1. **Single registration**: a device accumulator is initialised at most
//!    once; later registrations of the same id are ignored
//! 2. **Referential integrity**: every event row resolves to a component
//!    here, and every breakdown device resolves to a device here

use crate::core::time::{add_hours, overlap_hours, MissionClock, HOURS_PER_YEAR};
use crate::models::component::{ComponentId, DeviceId, DeviceRecord};
use crate::models::reliability::Breakdown;
use crate::models::strategy::{PerStrategy, Strategy};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Cost booked against a component by one dispatched action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub action_id: Uuid,
    pub date: NaiveDateTime,
    pub mode: usize,
    pub logistic: f64,
    pub labour: f64,
    pub spare: f64,
}

impl CostEntry {
    pub fn total(&self) -> f64 {
        self.logistic + self.labour + self.spare
    }
}

/// Logistics usage booked against a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticEntry {
    pub action_id: Uuid,
    pub vessel: String,
    pub sea_time_hours: f64,
    pub waiting_time_hours: f64,
}

/// Per-strategy ledger of a component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyLedger {
    pub costs: Vec<CostEntry>,
    pub logistics: Vec<LogisticEntry>,
    /// Set once logistics reported no weather window for this component
    pub no_weather_window: bool,
}

/// Mutable bookkeeping for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentAccumulator {
    pub component_id: ComponentId,
    /// Failure rate (1/year) keyed by mode id
    pub mode_failure_rates: BTreeMap<usize, f64>,
    pub breakdown: Breakdown,
    pub ledgers: PerStrategy<StrategyLedger>,
    /// Quoted cost of one repair per mode from the feasibility pre-check
    pub reference_cost: BTreeMap<usize, f64>,
}

impl ComponentAccumulator {
    pub fn new(
        component_id: ComponentId,
        mode_failure_rates: BTreeMap<usize, f64>,
        breakdown: Breakdown,
    ) -> Self {
        Self {
            component_id,
            mode_failure_rates,
            breakdown,
            ledgers: PerStrategy::default(),
            reference_cost: BTreeMap::new(),
        }
    }

    pub fn total_failure_rate(&self) -> f64 {
        self.mode_failure_rates.values().sum()
    }

    pub fn mode_failure_rate(&self, mode: usize) -> f64 {
        self.mode_failure_rates.get(&mode).copied().unwrap_or(0.0)
    }

    pub fn total_cost(&self, strategy: Strategy) -> f64 {
        self.ledgers[strategy].costs.iter().map(CostEntry::total).sum()
    }
}

/// One outage booked against a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeEntry {
    pub start: NaiveDateTime,
    pub duration_hours: f64,
    pub mode: usize,
    pub component_id: ComponentId,
}

impl DowntimeEntry {
    pub fn end(&self) -> NaiveDateTime {
        add_hours(self.start, self.duration_hours)
    }
}

/// Mutable bookkeeping for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAccumulator {
    pub device_id: DeviceId,
    pub downtime: PerStrategy<Vec<DowntimeEntry>>,
    /// Annual energy from the upstream energy model (MWh)
    pub annual_energy_mwh: f64,
    /// Realized energy per calendar year (MWh), filled at the end of a run
    pub realized_energy_mwh: BTreeMap<i32, f64>,
    /// Plain sum of all booked downtime, overlaps included
    pub cumulative_downtime_hours: f64,
    /// Device switched off for the rest of the mission for this strategy
    pub curtailed: PerStrategy<bool>,
}

impl DeviceAccumulator {
    pub fn new(device_id: DeviceId, annual_energy_mwh: f64) -> Self {
        Self {
            device_id,
            downtime: PerStrategy::default(),
            annual_energy_mwh,
            realized_energy_mwh: BTreeMap::new(),
            cumulative_downtime_hours: 0.0,
            curtailed: PerStrategy::default(),
        }
    }

    pub fn record_downtime(&mut self, strategy: Strategy, entry: DowntimeEntry) {
        self.cumulative_downtime_hours += entry.duration_hours.max(0.0);
        self.downtime[strategy].push(entry);
    }

    /// Outage intervals of all strategies clipped to the mission and merged,
    /// so overlapping outages count once.
    pub fn merged_downtime(&self, clock: &MissionClock) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        let mut intervals: Vec<(NaiveDateTime, NaiveDateTime)> = Strategy::ALL
            .iter()
            .flat_map(|s| self.downtime[*s].iter())
            .filter(|e| e.duration_hours > 0.0)
            .map(|e| (clock.clamp(e.start), clock.clamp(e.end())))
            .filter(|(s, e)| e > s)
            .collect();
        intervals.sort();

        let mut merged: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::with_capacity(intervals.len());
        for (start, end) in intervals {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    pub fn merged_downtime_hours(&self, clock: &MissionClock) -> f64 {
        self.merged_downtime(clock)
            .iter()
            .map(|(s, e)| crate::core::time::hours_between(*s, *e))
            .sum()
    }

    /// Fill `realized_energy_mwh` for every mission year.
    pub fn finalize_energy(&mut self, clock: &MissionClock) {
        let merged = self.merged_downtime(clock);
        let hourly = self.annual_energy_mwh / HOURS_PER_YEAR;
        self.realized_energy_mwh.clear();
        for span in clock.year_spans() {
            let down: f64 = merged
                .iter()
                .map(|(s, e)| overlap_hours(*s, *e, span.start, span.end))
                .sum();
            let realized = (span.hours() - down).max(0.0) * hourly;
            self.realized_energy_mwh.insert(span.year, realized);
        }
    }
}

/// Per-component and per-device state of the whole array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayState {
    components: BTreeMap<ComponentId, ComponentAccumulator>,
    devices: BTreeMap<DeviceId, DeviceAccumulator>,
    device_order: Vec<DeviceId>,
}

impl ArrayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device; returns false (and changes nothing) if it exists.
    pub fn register_device(&mut self, device: &DeviceRecord) -> bool {
        if self.devices.contains_key(&device.id) {
            return false;
        }
        self.device_order.push(device.id.clone());
        self.devices.insert(
            device.id.clone(),
            DeviceAccumulator::new(device.id.clone(), device.annual_energy_mwh),
        );
        true
    }

    /// Register a component; returns false if the id is already taken.
    pub fn register_component(&mut self, accumulator: ComponentAccumulator) -> bool {
        if self.components.contains_key(&accumulator.component_id) {
            return false;
        }
        self.components.insert(accumulator.component_id.clone(), accumulator);
        true
    }

    pub fn component(&self, id: &str) -> Option<&ComponentAccumulator> {
        self.components.get(id)
    }

    pub fn component_mut(&mut self, id: &str) -> Option<&mut ComponentAccumulator> {
        self.components.get_mut(id)
    }

    pub fn device(&self, id: &str) -> Option<&DeviceAccumulator> {
        self.devices.get(id)
    }

    pub fn device_mut(&mut self, id: &str) -> Option<&mut DeviceAccumulator> {
        self.devices.get_mut(id)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentAccumulator> {
        self.components.values()
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceAccumulator> {
        self.device_order.iter().filter_map(|id| self.devices.get(id))
    }

    /// Device ids in registration order
    pub fn device_ids(&self) -> &[DeviceId] {
        &self.device_order
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn num_devices(&self) -> usize {
        self.devices.len()
    }

    /// Devices affected when `component_id` is down.
    pub fn affected_devices(&self, component_id: &str) -> Vec<DeviceId> {
        self.components
            .get(component_id)
            .map(|c| c.breakdown.resolve(&self.device_order))
            .unwrap_or_default()
    }

    /// True when every device of the array is curtailed for `strategy`.
    pub fn all_curtailed(&self, strategy: Strategy) -> bool {
        !self.devices.is_empty() && self.devices.values().all(|d| d.curtailed[strategy])
    }

    /// True when every listed device is curtailed for `strategy`.
    pub fn devices_curtailed(&self, devices: &[DeviceId], strategy: Strategy) -> bool {
        !devices.is_empty()
            && devices
                .iter()
                .all(|id| self.devices.get(id).map_or(false, |d| d.curtailed[strategy]))
    }

    pub fn finalize_energy(&mut self, clock: &MissionClock) {
        for device in self.devices.values_mut() {
            device.finalize_energy(clock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn device(id: &str, energy: f64) -> DeviceRecord {
        DeviceRecord {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            zone: String::new(),
            depth_m: 50.0,
            soil_type: String::new(),
            annual_energy_mwh: energy,
        }
    }

    fn entry(start: NaiveDateTime, hours: f64) -> DowntimeEntry {
        DowntimeEntry {
            start,
            duration_hours: hours,
            mode: 1,
            component_id: "pto001".to_string(),
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut state = ArrayState::new();
        assert!(state.register_device(&device("device001", 100.0)));
        state
            .device_mut("device001")
            .unwrap()
            .cumulative_downtime_hours = 5.0;
        assert!(!state.register_device(&device("device001", 999.0)));

        let d = state.device("device001").unwrap();
        assert_eq!(d.annual_energy_mwh, 100.0);
        assert_eq!(d.cumulative_downtime_hours, 5.0);
        assert_eq!(state.device_ids().len(), 1);
    }

    #[test]
    fn test_merged_downtime_counts_overlap_once() {
        let clock = MissionClock::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 1);
        let t0 = clock.start();
        let mut d = DeviceAccumulator::new("device001".to_string(), 8760.0);
        d.record_downtime(Strategy::Corrective, entry(t0, 10.0));
        d.record_downtime(Strategy::Calendar, entry(add_hours(t0, 5.0), 10.0));

        assert_eq!(d.cumulative_downtime_hours, 20.0);
        assert!((d.merged_downtime_hours(&clock) - 15.0).abs() < 1e-9);

        d.finalize_energy(&clock);
        let realized = d.realized_energy_mwh[&2020];
        assert!((realized - (clock.mission_hours() - 15.0)).abs() < 1e-6);
    }

    #[test]
    fn test_downtime_clipped_to_mission() {
        let clock = MissionClock::from_days(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 1);
        let mut d = DeviceAccumulator::new("device001".to_string(), 0.0);
        d.record_downtime(Strategy::Corrective, entry(add_hours(clock.start(), 20.0), 100.0));
        assert!((d.merged_downtime_hours(&clock) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_curtailment_queries() {
        let mut state = ArrayState::new();
        state.register_device(&device("a", 1.0));
        state.register_device(&device("b", 1.0));
        state.device_mut("a").unwrap().curtailed[Strategy::Corrective] = true;

        assert!(state.devices_curtailed(&["a".to_string()], Strategy::Corrective));
        assert!(!state.all_curtailed(Strategy::Corrective));
        state.device_mut("b").unwrap().curtailed[Strategy::Corrective] = true;
        assert!(state.all_curtailed(Strategy::Corrective));
        assert!(!state.all_curtailed(Strategy::Calendar));
    }
}
