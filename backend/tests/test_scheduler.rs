//! Integration tests for the maintenance scheduler
//!
//! Tests cover:
//! - Corrective rows superseded by condition monitoring
//! - NoSolutionsFound aborting the replicate with its own error kind
//! - Repair-date monotonicity and cost non-negativity per strategy
//! - Curtailment after a missing weather window, and downtime to mission
//!   end without curtailment
//! - Oversized request delays disabling a mode instead of aborting
//! - Calendar batching, and the condition cost/benefit choice between
//!   deferring to a calendar action and repairing now

use chrono::{Duration, NaiveDate, NaiveDateTime};
use om_simulator_core_rs::core::time::hours_between;
use om_simulator_core_rs::logistics::{
    LogisticsOutcome, LogisticsRequest, LogisticsSolution, LogisticsSolver, SiteInfo, VesselUsage,
};
use om_simulator_core_rs::models::{
    ActionRecord, CalendarWindow, ComponentRecord, ConditionWindow, DeviceRecord,
    FailureModeRecord, ReliabilityOutput, SpareSpec, Strategy,
};
use om_simulator_core_rs::registry::{ArrayModel, ComponentRegistry, RegistryInput};
use om_simulator_core_rs::{
    EventLog, FailureProcessSampler, MaintenanceScheduler, MissionClock, RngManager,
    SamplerConfig, SchedulerError, SimulationConfig,
};

/// What the scripted solver answers
#[derive(Clone, Copy, PartialEq)]
enum Answer {
    Solve,
    NoWindow,
    NoSolution,
}

/// Solver answering every request the same way; solutions depart one
/// hour after the request and take eight hours at sea.
struct ScriptedSolver {
    answer: Answer,
    requests: Vec<LogisticsRequest>,
}

impl ScriptedSolver {
    fn new(answer: Answer) -> Self {
        Self {
            answer,
            requests: Vec::new(),
        }
    }
}

impl LogisticsSolver for ScriptedSolver {
    fn solve(&mut self, request: &LogisticsRequest) -> LogisticsOutcome {
        self.requests.push(request.clone());
        match self.answer {
            Answer::Solve => {
                let departure = request.requested + Duration::hours(1);
                LogisticsOutcome::SolutionFound(LogisticsSolution {
                    vessel: "CTV".to_string(),
                    vessels: vec![VesselUsage {
                        vessel_type: "CTV".to_string(),
                        count: 1,
                        hours: 8.0,
                    }],
                    departure,
                    end: departure + Duration::hours(8),
                    prep_time_hours: 1.0,
                    waiting_time_hours: 0.0,
                    sea_time_hours: 8.0,
                    total_cost: 1000.0,
                })
            }
            Answer::NoWindow => LogisticsOutcome::NoWeatherWindowFound,
            Answer::NoSolution => LogisticsOutcome::NoSolutionsFound,
        }
    }
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()
}

fn device(id: &str) -> DeviceRecord {
    DeviceRecord {
        id: id.to_string(),
        x: 0.0,
        y: 0.0,
        zone: "30U".to_string(),
        depth_m: 45.0,
        soil_type: "sand".to_string(),
        annual_energy_mwh: 8760.0,
    }
}

fn component(id: &str, owner: &str, rate: f64) -> ComponentRecord {
    ComponentRecord {
        id: id.to_string(),
        component_type: owner.to_string(),
        component_subtype: "PTO".to_string(),
        failure_rate: rate,
        failure_mode_count: Some(1),
        calendar: None,
        condition: None,
        floating: true,
    }
}

fn export_cable() -> ComponentRecord {
    ComponentRecord {
        component_subtype: "Export Cable".to_string(),
        floating: false,
        ..component("exp001", "Array", 3.0)
    }
}

fn mode(component: &str) -> FailureModeRecord {
    FailureModeRecord {
        component_id: component.to_string(),
        mode: 1,
        probability_pct: 100.0,
        spare: SpareSpec {
            cost: 500.0,
            cost_transit: Some(20.0),
            ..SpareSpec::default()
        },
    }
}

fn action(component: &str, hours: f64) -> ActionRecord {
    ActionRecord {
        component_id: component.to_string(),
        mode: 1,
        duration_maintenance_hours: hours,
        duration_access_hours: 1.0,
        delay_crew_hours: 24.0,
        delay_organisation_hours: 0.0,
        technicians: 2,
        specialists: 1,
        access_limits: Default::default(),
        work_limits: Default::default(),
        requires_lifting: false,
        requires_divers: false,
        requires_towing: false,
    }
}

struct Fixture {
    config: SimulationConfig,
    components: Vec<ComponentRecord>,
    modes: Vec<FailureModeRecord>,
    repairs: Vec<ActionRecord>,
    inspections: Vec<ActionRecord>,
    devices: Vec<DeviceRecord>,
}

impl Fixture {
    fn new(mission_years: u32) -> Self {
        let config = SimulationConfig {
            start_date: start(),
            mission_years,
            feasibility_check: false,
            sampler: SamplerConfig {
                trials: 300,
                ..SamplerConfig::default()
            },
            ..SimulationConfig::default()
        };
        Self {
            config,
            components: Vec::new(),
            modes: Vec::new(),
            repairs: Vec::new(),
            inspections: Vec::new(),
            devices: vec![device("device001"), device("device002")],
        }
    }

    fn with_component(mut self, record: ComponentRecord, with_inspection: bool) -> Self {
        self.modes.push(mode(&record.id));
        self.repairs.push(action(&record.id, 6.0));
        if with_inspection {
            self.inspections.push(action(&record.id, 3.0));
        }
        self.components.push(record);
        self
    }

    fn clock(&self) -> MissionClock {
        MissionClock::new(self.config.start_date, self.config.mission_years)
    }

    fn model(&self, seed: u64) -> ArrayModel {
        let reliability = ReliabilityOutput::default();
        let registry = ComponentRegistry::new(
            self.clock(),
            FailureProcessSampler::new(self.config.sampler.clone()),
        );
        registry
            .build(
                RegistryInput {
                    reliability: &reliability,
                    components: &self.components,
                    failure_modes: &self.modes,
                    repair_actions: &self.repairs,
                    inspections: &self.inspections,
                    devices: &self.devices,
                },
                &mut RngManager::new(seed),
                &mut EventLog::new(),
            )
            .unwrap()
    }

    fn scheduler(&self, answer: Answer, seed: u64) -> MaintenanceScheduler<ScriptedSolver> {
        MaintenanceScheduler::new(
            self.config.clone(),
            self.clock(),
            self.model(seed),
            SiteInfo::default(),
            ScriptedSolver::new(answer),
            RngManager::new(seed + 1000),
        )
    }
}

fn condition_window() -> ConditionWindow {
    ConditionWindow {
        start_month: None,
        end_month: None,
        soh_threshold_pct: 50.0,
    }
}

fn january_window() -> CalendarWindow {
    CalendarWindow {
        start_month: 1,
        end_month: 2,
        interval_years: 1,
    }
}

#[test]
fn test_corrective_rows_superseded_by_condition_monitoring() {
    let mut monitored = component("pto001", "device001", 4.0);
    monitored.condition = Some(condition_window());
    let mut fixture = Fixture::new(5)
        .with_component(monitored, false)
        .with_component(component("pto002", "device002", 4.0), false);
    fixture.config.condition_enabled = true;

    let model = fixture.model(11);
    let had_rows = model
        .corrective
        .iter()
        .any(|e| e.component.component_id == "pto001");
    assert!(had_rows, "a 4/yr component fails within five years");

    let mut scheduler = fixture.scheduler(Answer::Solve, 11);
    assert!(scheduler
        .tables()
        .corrective
        .iter()
        .all(|e| e.component.component_id != "pto001"));
    assert_eq!(scheduler.log().events_of_type("CorrectiveSuperseded").len(), 1);

    scheduler.run().unwrap();
    let outputs = scheduler.outputs();
    assert!(outputs.corrective.iter().all(|r| r.component_id != "pto001"));
    assert!(outputs.condition.iter().all(|r| r.component_id == "pto001"));
    assert!(!outputs.condition.is_empty());
}

#[test]
fn test_no_solutions_found_aborts_in_feasibility_check() {
    let mut fixture = Fixture::new(2).with_component(component("pto001", "device001", 2.0), false);
    fixture.config.feasibility_check = true;

    let mut scheduler = fixture.scheduler(Answer::NoSolution, 3);
    let err = scheduler.run().unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::NoSolutionsFound {
            strategy: Strategy::Corrective,
            ref component_id,
            ..
        } if component_id == "pto001"
    ));
    assert_eq!(scheduler.solver().requests.len(), 1);
}

#[test]
fn test_no_solutions_found_aborts_during_run() {
    let fixture = Fixture::new(3).with_component(component("pto001", "device001", 5.0), false);
    let mut scheduler = fixture.scheduler(Answer::NoSolution, 5);
    assert!(!scheduler.tables().corrective.is_empty());

    match scheduler.run() {
        Err(SchedulerError::NoSolutionsFound { strategy, component_id, requested }) => {
            assert_eq!(strategy, Strategy::Corrective);
            assert_eq!(component_id, "pto001");
            assert!(requested >= scheduler.clock().start());
        }
        other => panic!("expected NoSolutionsFound, got {:?}", other.map(|s| s.phase)),
    }
    assert!(scheduler.outputs().corrective.is_empty());
}

#[test]
fn test_repair_dates_monotonic_and_costs_non_negative() {
    let mut a = component("pto001", "device001", 6.0);
    a.calendar = Some(january_window());
    let mut b = component("pto002", "device002", 6.0);
    b.condition = Some(condition_window());
    let mut fixture = Fixture::new(4)
        .with_component(a, true)
        .with_component(b, false)
        .with_component(export_cable(), false);
    fixture.config.calendar_enabled = true;
    fixture.config.condition_enabled = true;
    fixture.config.feasibility_check = true;

    let mut scheduler = fixture.scheduler(Answer::Solve, 21);
    let state = scheduler.run().unwrap();
    assert!(state.phase.is_done());

    for strategy in Strategy::ALL {
        let table = scheduler.outputs().table(strategy);
        assert!(
            table.windows(2).all(|w| w[0].repair_date <= w[1].repair_date),
            "{} repair dates must not decrease",
            strategy
        );
        for record in table {
            let total = record.cost_labour + record.cost_spare;
            assert!(record.cost_spare >= 0.0);
            assert!(total >= record.cost_spare);
            assert!(record.cost_logistic >= 0.0);
            assert!(record.repair_date >= record.request_date);
        }
    }

    // Array-owned components knock out every device
    let export_rows = scheduler
        .outputs()
        .corrective
        .iter()
        .filter(|r| r.component_id == "exp001")
        .count();
    assert_eq!(export_rows % 2, 0);
    assert!(state.dispatched.calendar > 0);
}

#[test]
fn test_no_weather_window_curtails_and_short_circuits() {
    let mut fixture = Fixture::new(3).with_component(component("pto001", "device001", 6.0), false);
    fixture.devices = vec![device("device001")];
    fixture.config.curtail_devices = true;

    let mut scheduler = fixture.scheduler(Answer::NoWindow, 8);
    assert!(scheduler.tables().corrective.len() > 1);
    let state = scheduler.run().unwrap();

    assert_eq!(state.turned_off_devices, 1);
    assert_eq!(scheduler.solver().requests.len(), 1);
    assert!(scheduler.outputs().corrective.is_empty());

    let array = scheduler.array();
    let device = array.device("device001").unwrap();
    assert!(device.curtailed[Strategy::Corrective]);
    assert!(array.component("pto001").unwrap().ledgers[Strategy::Corrective].no_weather_window);

    let first_request = scheduler.solver().requests[0].requested;
    let down = device.merged_downtime_hours(scheduler.clock());
    assert!((down - hours_between(first_request, scheduler.clock().end())).abs() < 1e-6);
    assert_eq!(scheduler.log().events_of_type("DeviceCurtailed").len(), 1);
}

#[test]
fn test_no_weather_window_without_curtailment_keeps_dispatching() {
    let mut fixture = Fixture::new(3).with_component(component("pto001", "device001", 6.0), false);
    fixture.devices = vec![device("device001")];
    assert!(!fixture.config.curtail_devices);

    let mut scheduler = fixture.scheduler(Answer::NoWindow, 8);
    let rows = scheduler.tables().corrective.len();
    assert!(rows > 1);
    let state = scheduler.run().unwrap();

    // Every row is still requested; nothing is booked or switched off
    assert_eq!(scheduler.solver().requests.len(), rows);
    assert_eq!(state.turned_off_devices, 0);
    assert!(scheduler.outputs().corrective.is_empty());
    assert!(scheduler.log().events_of_type("DeviceCurtailed").is_empty());

    let array = scheduler.array();
    let device = array.device("device001").unwrap();
    assert!(!device.curtailed[Strategy::Corrective]);
    assert!(array.component("pto001").unwrap().ledgers[Strategy::Corrective].no_weather_window);

    let first_request = scheduler.solver().requests[0].requested;
    let down = device.merged_downtime_hours(scheduler.clock());
    assert!((down - hours_between(first_request, scheduler.clock().end())).abs() < 1e-6);
}

#[test]
fn test_oversized_request_delay_does_not_abort() {
    let mut fixture = Fixture::new(2)
        .with_component(component("pto001", "device001", 4.0), false)
        .with_component(component("pto002", "device002", 4.0), false);
    fixture.repairs[0].delay_crew_hours = 1.0e15;

    let mut scheduler = fixture.scheduler(Answer::Solve, 9);
    assert!(scheduler
        .tables()
        .corrective
        .iter()
        .all(|e| e.component.component_id != "pto001"));
    scheduler.run().unwrap();

    let outputs = &scheduler.outputs().corrective;
    assert!(!outputs.is_empty());
    assert!(outputs.iter().all(|r| r.component_id == "pto002"));
}

#[test]
fn test_calendar_actions_batched_per_window() {
    let mut fixture = Fixture::new(2);
    for id in ["pto001", "pto002", "pto003"] {
        let mut record = component(id, "device001", 0.0);
        record.calendar = Some(january_window());
        fixture = fixture.with_component(record, true);
    }
    fixture.config.corrective_enabled = false;
    fixture.config.calendar_enabled = true;

    let mut scheduler = fixture.scheduler(Answer::Solve, 2);
    assert_eq!(scheduler.tables().calendar.len(), 6);
    let state = scheduler.run().unwrap();

    // One dispatch per year for three components
    let requests = &scheduler.solver().requests;
    assert_eq!(requests.len(), 2);
    assert_eq!(state.dispatched.calendar, 2);
    assert_eq!(requests[0].on_site_duration_hours, 9.0);

    let first_year: Vec<_> = scheduler
        .outputs()
        .calendar
        .iter()
        .filter(|r| r.repair_date < at(2017, 1, 1))
        .collect();
    assert_eq!(first_year.len(), 3);
    let logistic: f64 = first_year.iter().map(|r| r.cost_logistic).sum();
    assert!((logistic - 1000.0).abs() < 1e-6);
    assert!(first_year.iter().all(|r| r.cost_spare == 0.0));
    assert!(scheduler.tables().calendar.iter().all(|r| r.action_start.is_some()));
}

#[test]
fn test_condition_alarm_deferred_to_calendar() {
    let mut record = component("pto001", "device001", 2.0);
    record.calendar = Some(january_window());
    record.condition = Some(condition_window());
    let mut fixture = Fixture::new(3).with_component(record, true);
    fixture.config.corrective_enabled = false;
    fixture.config.calendar_enabled = true;
    fixture.config.condition_enabled = true;
    fixture.config.feasibility_check = true;
    fixture.config.condition_lookahead_days = 366;
    fixture.config.energy_price_per_mwh = 0.0;

    let mut scheduler = fixture.scheduler(Answer::Solve, 4);
    scheduler.run().unwrap();

    let deferrals = scheduler.log().events_of_type("DeferredToCalendar");
    assert!(!deferrals.is_empty());
    assert!(scheduler
        .tables()
        .condition
        .iter()
        .any(|r| r.preempted_by_calendar));
}

#[test]
fn test_condition_alarm_repaired_when_waiting_costs_more() {
    let mut record = component("pto001", "device001", 2.0);
    record.calendar = Some(january_window());
    record.condition = Some(condition_window());
    let mut fixture = Fixture::new(3).with_component(record, true);
    fixture.config.corrective_enabled = false;
    fixture.config.calendar_enabled = true;
    fixture.config.condition_enabled = true;
    fixture.config.feasibility_check = true;
    fixture.config.condition_lookahead_days = 366;
    fixture.config.energy_price_per_mwh = 1.0e12;

    let mut scheduler = fixture.scheduler(Answer::Solve, 4);
    let state = scheduler.run().unwrap();

    assert!(scheduler.log().events_of_type("DeferredToCalendar").is_empty());
    assert!(scheduler
        .tables()
        .condition
        .iter()
        .all(|r| !r.preempted_by_calendar));
    assert!(state.dispatched.condition > 0);
    assert!(!scheduler.outputs().condition.is_empty());
}

#[test]
fn test_repeated_failures_shift_later_rows() {
    let fixture = Fixture::new(2).with_component(component("pto001", "device001", 12.0), false);
    let mut scheduler = fixture.scheduler(Answer::Solve, 17);
    assert!(scheduler.tables().corrective.len() > 2);
    scheduler.run().unwrap();

    assert!(!scheduler.log().events_of_type("CorrectiveShifted").is_empty());
    let state_rows = &scheduler.outputs().corrective;
    assert!(state_rows.iter().all(|r| r.downtime_hours >= 8.0));
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
}
