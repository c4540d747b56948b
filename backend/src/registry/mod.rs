//! Component registry (array builder)
//!
//! Runs once per replicate. Maps the reliability network's output and the
//! static input tables onto:
//!
//! 1. a [`ComponentCatalog`] of resolved, immutable component profiles
//! 2. an [`ArrayState`] with one accumulator per component and per device
//! 3. the Poisson-backed corrective event table, ordered by request date
//! 4. one synthetic "no-Poisson" corrective row per component mode, ordered
//!    by component id, used for logistics feasibility checks
//!
//! # Failure-rate resolution
//!
//! Network rows are preferred. Mooring lines and foundations each take half
//! of the combined M&F rate; dynamic cables use their own network row when
//! the electrical layout has one and half of the M&F rate otherwise.
//! Subhub components sum the subhub electrical and M&F rows. When nothing
//! matches, the static component rate is used and a diagnostic logged.
//!
//! # Absorbed input problems
//!
//! Malformed windows, missing actions, unknown devices and duplicate ids are
//! logged as events and only affect the component concerned.

mod catalog;

pub use catalog::{ComponentCatalog, ComponentProfile, Location, RateSource};

use crate::core::time::{add_hours, MissionClock, DAYS_PER_YEAR};
use crate::failure::FailureProcessSampler;
use crate::models::component::{
    ActionRecord, ComponentKind, ComponentRecord, DeviceId, DeviceRecord, FailureModeRecord,
    Owner,
};
use crate::models::event::{Event, EventLog};
use crate::models::reliability::{Breakdown, NetworkNode, RamTable, ReliabilityOutput, Subsystem};
use crate::models::state::{ArrayState, ComponentAccumulator};
use crate::models::strategy::Strategy;
use crate::models::tables::{ComponentRef, CorrectiveEvent};
use crate::rng::RngManager;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that make a whole replicate impossible to build
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Array has no devices")]
    NoDevices,

    #[error("Array has no components")]
    NoComponents,
}

/// Static tables consumed by the registry.
#[derive(Debug, Clone, Copy)]
pub struct RegistryInput<'a> {
    pub reliability: &'a ReliabilityOutput,
    pub components: &'a [ComponentRecord],
    pub failure_modes: &'a [FailureModeRecord],
    pub repair_actions: &'a [ActionRecord],
    pub inspections: &'a [ActionRecord],
    pub devices: &'a [DeviceRecord],
}

/// Output of one registry build.
#[derive(Debug, Clone)]
pub struct ArrayModel {
    pub catalog: ComponentCatalog,
    pub array: ArrayState,
    pub ram: RamTable,
    /// Realized failures, ordered by request date
    pub corrective: Vec<CorrectiveEvent>,
    /// One row per component mode, ordered by component id
    pub corrective_no_poisson: Vec<CorrectiveEvent>,
}

/// Builds the per-replicate array model.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    clock: MissionClock,
    sampler: FailureProcessSampler,
}

impl ComponentRegistry {
    pub fn new(clock: MissionClock, sampler: FailureProcessSampler) -> Self {
        Self { clock, sampler }
    }

    pub fn clock(&self) -> &MissionClock {
        &self.clock
    }

    /// Build the array model. Per-component problems are logged to `log`;
    /// only an empty array is an error.
    pub fn build(
        &self,
        input: RegistryInput<'_>,
        rng: &mut RngManager,
        log: &mut EventLog,
    ) -> Result<ArrayModel, RegistryError> {
        let at = self.clock.start();

        let (ram, corrections) = RamTable::from_network(input.reliability);
        for c in corrections {
            debug!(owner = %c.owner, before = c.before, after = c.after, "dynamic cable rate removed");
            log.log(Event::RateCorrected {
                at,
                owner: c.owner,
                before: c.before,
                after: c.after,
            });
        }

        let mut array = ArrayState::new();
        let mut catalog = ComponentCatalog::default();

        for device in input.devices {
            if array.register_device(device) {
                catalog.insert_device(device.clone());
            } else {
                warn!(device = %device.id, "duplicate device ignored");
                log.log(Event::DuplicateDevice {
                    at,
                    device_id: device.id.clone(),
                });
            }
        }

        let modes_by_component = group_by_component(input.failure_modes, |m| &m.component_id);
        let repairs_by_component = group_by_component(input.repair_actions, |a| &a.component_id);
        let inspections_by_component = group_by_component(input.inspections, |a| &a.component_id);

        for record in input.components {
            let owner = Owner::parse(&record.component_type);

            if let Some(device_id) = owner.device_id() {
                if array.device(device_id).is_none() {
                    let placeholder = placeholder_device(device_id);
                    array.register_device(&placeholder);
                    catalog.insert_device(placeholder);
                    log.log(Event::Diagnostic {
                        at,
                        component_id: record.id.clone(),
                        message: format!("device {} missing from device table; no energy yield", device_id),
                    });
                }
            }

            let kind = ComponentKind::resolve(&owner, &record.component_subtype);
            let (failure_rate, rate_source, row_breakdown) =
                self.resolve_failure_rate(record, &owner, kind, &ram, log);

            let breakdown = self.resolve_breakdown(
                record,
                &owner,
                row_breakdown,
                input.reliability,
                &array,
                log,
            );

            let mut modes: Vec<FailureModeRecord> = modes_by_component
                .get(record.id.as_str())
                .map(|m| m.iter().map(|r| (*r).clone()).collect())
                .unwrap_or_default();
            modes.sort_by_key(|m| m.mode);
            self.check_modes(record, &modes, log);

            let repairs = index_by_mode(repairs_by_component.get(record.id.as_str()));
            let inspections = index_by_mode(inspections_by_component.get(record.id.as_str()));

            let calendar = match record.calendar {
                Some(window) => match window.validate() {
                    Ok(()) => Some(window),
                    Err(reason) => {
                        disable(log, at, &record.id, Strategy::Calendar, reason);
                        None
                    }
                },
                None => None,
            };
            let condition = match record.condition {
                Some(window) => match window.validate() {
                    Ok(()) => Some(window),
                    Err(reason) => {
                        disable(log, at, &record.id, Strategy::Condition, reason);
                        None
                    }
                },
                None => None,
            };

            let location = breakdown
                .resolve(array.device_ids())
                .first()
                .and_then(|d| catalog.device(d))
                .map(Location::from)
                .unwrap_or_default();

            let profile = ComponentProfile {
                reference: ComponentRef {
                    component_id: record.id.clone(),
                    kind,
                    subtype: record.component_subtype.clone(),
                    owner,
                },
                failure_rate,
                rate_source,
                modes,
                repairs,
                inspections,
                calendar,
                condition,
                floating: record.floating,
                location,
            };

            let mode_rates: BTreeMap<usize, f64> = profile
                .modes
                .iter()
                .map(|m| (m.mode, profile.mode_failure_rate(m)))
                .collect();
            let accumulator = ComponentAccumulator::new(record.id.clone(), mode_rates, breakdown);

            if !array.register_component(accumulator) || !catalog.insert_profile(profile) {
                warn!(component = %record.id, "duplicate component ignored");
                log.log(Event::Diagnostic {
                    at,
                    component_id: record.id.clone(),
                    message: "duplicate component id ignored".to_string(),
                });
            }
        }

        if array.num_devices() == 0 {
            return Err(RegistryError::NoDevices);
        }
        if catalog.is_empty() {
            return Err(RegistryError::NoComponents);
        }

        let (corrective, corrective_no_poisson) = self.corrective_tables(&catalog, rng, log);

        debug!(
            components = catalog.len(),
            devices = array.num_devices(),
            failures = corrective.len(),
            "array model built"
        );

        Ok(ArrayModel {
            catalog,
            array,
            ram,
            corrective,
            corrective_no_poisson,
        })
    }

    fn resolve_failure_rate(
        &self,
        record: &ComponentRecord,
        owner: &Owner,
        kind: ComponentKind,
        ram: &RamTable,
        log: &mut EventLog,
    ) -> (f64, RateSource, Option<Breakdown>) {
        let key = owner.key();
        let network = match owner {
            Owner::Subhub(_) => {
                let elec = ram.row(key, Subsystem::SubhubElectrical);
                let mf = ram.row(key, Subsystem::SubhubMooringFoundation);
                if elec.is_none() && mf.is_none() {
                    None
                } else {
                    let rate = ram.rate(key, Subsystem::SubhubElectrical).unwrap_or(0.0)
                        + ram.rate(key, Subsystem::SubhubMooringFoundation).unwrap_or(0.0);
                    let breakdown = elec.or(mf).and_then(|r| r.breakdown.clone());
                    Some((rate, breakdown))
                }
            }
            _ => match kind {
                ComponentKind::MooringLine | ComponentKind::Foundation => ram
                    .row(key, Subsystem::MooringFoundation)
                    .map(|r| (0.5 * r.failure_rate, r.breakdown.clone())),
                ComponentKind::DynamicCable => ram
                    .row(key, Subsystem::DynamicCable)
                    .map(|r| (r.failure_rate, r.breakdown.clone()))
                    .or_else(|| {
                        ram.row(key, Subsystem::MooringFoundation)
                            .map(|r| (0.5 * r.failure_rate, r.breakdown.clone()))
                    }),
                _ => subsystem_for(kind)
                    .and_then(|s| ram.row(key, s))
                    .map(|r| (r.failure_rate, r.breakdown.clone())),
            },
        };

        match network {
            Some((rate, breakdown)) if rate.is_finite() && rate >= 0.0 => {
                (rate, RateSource::Network, breakdown)
            }
            _ => {
                let rate = if record.failure_rate.is_finite() {
                    record.failure_rate.max(0.0)
                } else {
                    0.0
                };
                debug!(component = %record.id, rate, "no network row, static failure rate used");
                log.log(Event::FallbackFailureRate {
                    at: self.clock.start(),
                    component_id: record.id.clone(),
                    rate,
                });
                (rate, RateSource::Fallback, None)
            }
        }
    }

    fn resolve_breakdown(
        &self,
        record: &ComponentRecord,
        owner: &Owner,
        from_network: Option<Breakdown>,
        reliability: &ReliabilityOutput,
        array: &ArrayState,
        log: &mut EventLog,
    ) -> Breakdown {
        let breakdown = match (owner, from_network) {
            (Owner::Device(id), None) => Breakdown::Device(id.clone()),
            (_, Some(explicit)) => explicit,
            (Owner::Array, None) => Breakdown::All,
            (Owner::Subhub(hub), None) => {
                let devices = subhub_devices(reliability, hub);
                if devices.is_empty() {
                    Breakdown::All
                } else {
                    Breakdown::Devices(devices)
                }
            }
        };

        let unknown: Vec<DeviceId> = breakdown
            .resolve(array.device_ids())
            .into_iter()
            .filter(|d| array.device(d).is_none())
            .collect();
        if unknown.is_empty() {
            return breakdown;
        }

        log.log(Event::Diagnostic {
            at: self.clock.start(),
            component_id: record.id.clone(),
            message: format!("unknown devices dropped from breakdown: {}", unknown.join(", ")),
        });
        let known: Vec<DeviceId> = breakdown
            .resolve(array.device_ids())
            .into_iter()
            .filter(|d| array.device(d).is_some())
            .collect();
        match known.len() {
            0 => Breakdown::All,
            1 => Breakdown::Device(known[0].clone()),
            _ => Breakdown::Devices(known),
        }
    }

    fn check_modes(&self, record: &ComponentRecord, modes: &[FailureModeRecord], log: &mut EventLog) {
        let at = self.clock.start();
        if modes.is_empty() {
            log.log(Event::Diagnostic {
                at,
                component_id: record.id.clone(),
                message: "no failure modes; component never fails".to_string(),
            });
            return;
        }
        if let Some(expected) = record.failure_mode_count {
            if expected != modes.len() {
                log.log(Event::Diagnostic {
                    at,
                    component_id: record.id.clone(),
                    message: format!("{} failure modes declared, {} found", expected, modes.len()),
                });
            }
        }
        let total: f64 = modes.iter().map(|m| m.probability_pct).sum();
        if (total - 100.0).abs() > 1e-6 {
            log.log(Event::Diagnostic {
                at,
                component_id: record.id.clone(),
                message: format!("failure mode probabilities sum to {}%", total),
            });
        }
    }

    fn corrective_tables(
        &self,
        catalog: &ComponentCatalog,
        rng: &mut RngManager,
        log: &mut EventLog,
    ) -> (Vec<CorrectiveEvent>, Vec<CorrectiveEvent>) {
        let start = self.clock.start();
        let end = self.clock.end();
        let mission_days = self.clock.mission_days();
        let mut poisson = Vec::new();
        let mut no_poisson = Vec::new();

        for profile in catalog.profiles() {
            for mode in &profile.modes {
                if profile.repair(mode.mode).is_none() {
                    log.log(Event::Diagnostic {
                        at: start,
                        component_id: profile.id().to_string(),
                        message: format!("no repair action for mode {}; corrective disabled", mode.mode),
                    });
                    continue;
                }

                let rate = profile.mode_failure_rate(mode);
                let delay = profile.request_delay_hours(mode.mode);
                if add_hours(start, delay) > end {
                    warn!(component = %profile.id(), mode = mode.mode, delay, "request delay beyond mission");
                    log.log(Event::Diagnostic {
                        at: start,
                        component_id: profile.id().to_string(),
                        message: format!(
                            "request delay of {} h for mode {} exceeds the mission; corrective disabled",
                            delay, mode.mode
                        ),
                    });
                    continue;
                }
                let row = |failure_date: NaiveDateTime| CorrectiveEvent {
                    component: profile.reference.clone(),
                    mode: mode.mode,
                    failure_rate: rate,
                    failure_date,
                    request_date: add_hours(failure_date, delay),
                };

                no_poisson.push(row(start));
                let daily = rate / DAYS_PER_YEAR;
                for failure_date in self.sampler.sample(start.date(), mission_days, daily, rng) {
                    let event = row(failure_date);
                    if event.request_date <= end {
                        poisson.push(event);
                    }
                }
            }
        }

        poisson.sort_by_key(|e| e.request_date);
        no_poisson.sort_by(|a, b| {
            a.component
                .component_id
                .cmp(&b.component.component_id)
                .then(a.mode.cmp(&b.mode))
        });
        (poisson, no_poisson)
    }
}

fn subsystem_for(kind: ComponentKind) -> Option<Subsystem> {
    match kind {
        ComponentKind::Hydrodynamic => Some(Subsystem::Hydrodynamic),
        ComponentKind::Pto => Some(Subsystem::Pto),
        ComponentKind::Control => Some(Subsystem::Control),
        ComponentKind::SupportStructure => Some(Subsystem::SupportStructure),
        ComponentKind::ArrayCable => Some(Subsystem::ArrayElectrical),
        ComponentKind::ExportCable => Some(Subsystem::ExportCable),
        ComponentKind::Substation => Some(Subsystem::Substation),
        _ => None,
    }
}

/// Devices below a subhub in the network tree.
fn subhub_devices(reliability: &ReliabilityOutput, hub_id: &str) -> Vec<DeviceId> {
    fn collect(node: &NetworkNode, out: &mut Vec<DeviceId>) {
        match node {
            NetworkNode::Device(d) => out.push(d.device_id.clone()),
            NetworkNode::Subhub(h) => h.children.iter().for_each(|c| collect(c, out)),
        }
    }
    fn find<'a>(nodes: &'a [NetworkNode], hub_id: &str) -> Option<&'a NetworkNode> {
        nodes.iter().find_map(|n| match n {
            NetworkNode::Subhub(h) if h.subhub_id == hub_id => Some(n),
            NetworkNode::Subhub(h) => find(&h.children, hub_id),
            NetworkNode::Device(_) => None,
        })
    }

    let mut devices = Vec::new();
    if let Some(hub) = find(&reliability.nodes, hub_id) {
        collect(hub, &mut devices);
    }
    devices
}

fn group_by_component<'a, T>(
    rows: &'a [T],
    key: impl Fn(&T) -> &String,
) -> BTreeMap<&'a str, Vec<&'a T>> {
    let mut grouped: BTreeMap<&str, Vec<&T>> = BTreeMap::new();
    for row in rows {
        grouped.entry(key(row).as_str()).or_default().push(row);
    }
    grouped
}

fn index_by_mode(actions: Option<&Vec<&ActionRecord>>) -> BTreeMap<usize, ActionRecord> {
    let mut indexed = BTreeMap::new();
    for action in actions.into_iter().flatten() {
        indexed.entry(action.mode).or_insert_with(|| (*action).clone());
    }
    indexed
}

fn placeholder_device(id: &str) -> DeviceRecord {
    DeviceRecord {
        id: id.to_string(),
        x: 0.0,
        y: 0.0,
        zone: String::new(),
        depth_m: 0.0,
        soil_type: String::new(),
        annual_energy_mwh: 0.0,
    }
}

fn disable(log: &mut EventLog, at: NaiveDateTime, component_id: &str, strategy: Strategy, reason: String) {
    warn!(component = %component_id, %strategy, %reason, "maintenance window disabled");
    log.log(Event::MaintenanceDisabled {
        at,
        component_id: component_id.to_string(),
        strategy,
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::SamplerConfig;
    use crate::models::component::{CalendarWindow, SpareSpec};
    use crate::models::reliability::{DeviceNode, SubhubNode, SubsystemNode};
    use chrono::NaiveDate;

    fn clock() -> MissionClock {
        MissionClock::new(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(), 5)
    }

    fn device(id: &str) -> DeviceRecord {
        DeviceRecord {
            id: id.to_string(),
            x: 1.0,
            y: 2.0,
            zone: "30U".to_string(),
            depth_m: 40.0,
            soil_type: "sand".to_string(),
            annual_energy_mwh: 1000.0,
        }
    }

    fn component(id: &str, owner: &str, subtype: &str, rate: f64) -> ComponentRecord {
        ComponentRecord {
            id: id.to_string(),
            component_type: owner.to_string(),
            component_subtype: subtype.to_string(),
            failure_rate: rate,
            failure_mode_count: Some(2),
            calendar: None,
            condition: None,
            floating: true,
        }
    }

    fn mode(component: &str, mode: usize, pct: f64) -> FailureModeRecord {
        FailureModeRecord {
            component_id: component.to_string(),
            mode,
            probability_pct: pct,
            spare: SpareSpec {
                lead_time_hours: 10.0,
                ..SpareSpec::default()
            },
        }
    }

    fn action(component: &str, mode: usize) -> ActionRecord {
        ActionRecord {
            component_id: component.to_string(),
            mode,
            duration_maintenance_hours: 5.0,
            duration_access_hours: 1.0,
            delay_crew_hours: 12.0,
            delay_organisation_hours: 6.0,
            technicians: 2,
            specialists: 0,
            access_limits: Default::default(),
            work_limits: Default::default(),
            requires_lifting: false,
            requires_divers: false,
            requires_towing: false,
        }
    }

    fn subsystem(name: &str, per_hour: f64) -> SubsystemNode {
        SubsystemNode {
            name: name.to_string(),
            failure_rate_per_hour: per_hour,
            breakdown: None,
        }
    }

    #[test]
    fn test_rate_resolution_and_splitting() {
        let reliability = ReliabilityOutput {
            array: vec![subsystem("Export cable", 0.2 / 8760.0)],
            nodes: vec![NetworkNode::Subhub(SubhubNode {
                subhub_id: "subhub001".to_string(),
                subsystems: vec![
                    subsystem("Subhub elec sub-system", 0.1 / 8760.0),
                    subsystem("Subhub M&F sub-system", 0.05 / 8760.0),
                ],
                children: vec![NetworkNode::Device(DeviceNode {
                    device_id: "device001".to_string(),
                    subsystems: vec![
                        subsystem("PTO", 1.0 / 8760.0),
                        subsystem("M&F sub-system", 0.4 / 8760.0),
                    ],
                })],
            })],
        };
        let components = vec![
            component("pto001", "device001", "PTO", 9.0),
            component("moor001", "device001", "Mooring line", 9.0),
            component("hub001", "subhub001", "Hub", 9.0),
            component("exp001", "Array", "Export cable", 9.0),
            component("ctl001", "device001", "Control", 0.3),
        ];
        let devices = vec![device("device001"), device("device002")];
        let input = RegistryInput {
            reliability: &reliability,
            components: &components,
            failure_modes: &[],
            repair_actions: &[],
            inspections: &[],
            devices: &devices,
        };

        let registry = ComponentRegistry::new(clock(), FailureProcessSampler::default());
        let mut log = EventLog::new();
        let model = registry.build(input, &mut RngManager::new(1), &mut log).unwrap();

        let rate = |id: &str| model.catalog.profile(id).unwrap().failure_rate;
        assert!((rate("pto001") - 1.0).abs() < 1e-9);
        assert!((rate("moor001") - 0.2).abs() < 1e-9);
        assert!((rate("hub001") - 0.15).abs() < 1e-9);
        assert!((rate("exp001") - 0.2).abs() < 1e-9);
        assert_eq!(rate("ctl001"), 0.3);
        assert_eq!(
            model.catalog.profile("ctl001").unwrap().rate_source,
            RateSource::Fallback
        );
        assert_eq!(log.events_of_type("FallbackFailureRate").len(), 1);

        assert_eq!(model.array.affected_devices("exp001").len(), 2);
        assert_eq!(model.array.affected_devices("hub001"), vec!["device001".to_string()]);
        assert_eq!(model.array.affected_devices("pto001"), vec!["device001".to_string()]);
    }

    #[test]
    fn test_malformed_window_disables_one_strategy() {
        let mut bad = component("pto001", "device001", "PTO", 1.0);
        bad.calendar = Some(CalendarWindow {
            start_month: 13,
            end_month: 2,
            interval_years: 1,
        });
        let mut good = component("pto002", "device001", "PTO", 1.0);
        good.calendar = Some(CalendarWindow {
            start_month: 4,
            end_month: 6,
            interval_years: 1,
        });
        let components = vec![bad, good];
        let devices = vec![device("device001")];
        let reliability = ReliabilityOutput::default();
        let input = RegistryInput {
            reliability: &reliability,
            components: &components,
            failure_modes: &[],
            repair_actions: &[],
            inspections: &[],
            devices: &devices,
        };

        let registry = ComponentRegistry::new(clock(), FailureProcessSampler::default());
        let mut log = EventLog::new();
        let model = registry.build(input, &mut RngManager::new(1), &mut log).unwrap();

        assert!(model.catalog.profile("pto001").unwrap().calendar.is_none());
        assert!(model.catalog.profile("pto002").unwrap().calendar.is_some());
        assert_eq!(log.events_of_type("MaintenanceDisabled").len(), 1);
    }

    #[test]
    fn test_no_poisson_rows_and_request_delay() {
        let components = vec![component("pto001", "device001", "PTO", 2.0)];
        let modes = vec![mode("pto001", 1, 60.0), mode("pto001", 2, 40.0)];
        let actions = vec![action("pto001", 1)];
        let devices = vec![device("device001")];
        let reliability = ReliabilityOutput::default();
        let input = RegistryInput {
            reliability: &reliability,
            components: &components,
            failure_modes: &modes,
            repair_actions: &actions,
            inspections: &[],
            devices: &devices,
        };

        let sampler = FailureProcessSampler::new(SamplerConfig {
            trials: 200,
            ..SamplerConfig::default()
        });
        let registry = ComponentRegistry::new(clock(), sampler);
        let mut log = EventLog::new();
        let model = registry.build(input, &mut RngManager::new(3), &mut log).unwrap();

        // Mode 2 lacks a repair action
        assert_eq!(model.corrective_no_poisson.len(), 1);
        let row = &model.corrective_no_poisson[0];
        assert_eq!(row.mode, 1);
        assert!((row.failure_rate - 1.2).abs() < 1e-9);
        // max(12 + 6, 10) hours
        assert_eq!(
            crate::core::time::hours_between(row.failure_date, row.request_date),
            18.0
        );
        assert!(model.corrective.iter().all(|e| e.mode == 1));
        assert!(model
            .corrective
            .windows(2)
            .all(|w| w[0].request_date <= w[1].request_date));
        assert_eq!(log.events_of_type("Diagnostic").len(), 1);
        assert_eq!(log.events_of_type("FallbackFailureRate").len(), 1);
    }

    #[test]
    fn test_empty_array_is_an_error() {
        let reliability = ReliabilityOutput::default();
        let input = RegistryInput {
            reliability: &reliability,
            components: &[],
            failure_modes: &[],
            repair_actions: &[],
            inspections: &[],
            devices: &[],
        };
        let registry = ComponentRegistry::new(clock(), FailureProcessSampler::default());
        let result = registry.build(input, &mut RngManager::new(1), &mut EventLog::new());
        assert_eq!(result.err(), Some(RegistryError::NoDevices));
    }
}
