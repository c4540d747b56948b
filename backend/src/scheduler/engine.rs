//! Scheduler engine
//!
//! Owns the replicate's array state, the three event tables and the
//! logistics solver. See the module docs of [`crate::scheduler`] for the
//! state machine.

use super::tables::{calendar_table, condition_table, next_alarm, shift_into_window};
use super::{SchedulerError, SchedulerPhase, SchedulerState};
use crate::config::SimulationConfig;
use crate::core::time::{add_hours, hours_between, MissionClock, HOURS_PER_YEAR};
use crate::costs::{ActionCost, ActionKind, CostAccumulator, CostModel, Crew, EnvironmentalRecord};
use crate::logistics::{
    LogisticsOutcome, LogisticsRequest, LogisticsSolver, Operation, SiteInfo, SpareDimensions,
};
use crate::models::component::{ActionRecord, DeviceId, SpareSpec};
use crate::models::event::{Event, EventLog};
use crate::models::state::{ArrayState, CostEntry, DowntimeEntry, LogisticEntry};
use crate::models::strategy::{PerStrategy, Strategy};
use crate::models::tables::{
    CalendarEvent, ComponentRef, ConditionEvent, CorrectiveEvent, MaintenanceRecord, OutputTables,
};
use crate::registry::{ArrayModel, ComponentCatalog, ComponentProfile};
use crate::rng::RngManager;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use uuid::{Builder, Uuid};

/// Stream used to derive action identifiers from the replicate RNG.
const ACTION_ID_STREAM: u64 = 1;

/// Input event tables, mutated as the replicate runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerTables {
    pub corrective: Vec<CorrectiveEvent>,
    pub corrective_no_poisson: Vec<CorrectiveEvent>,
    pub calendar: Vec<CalendarEvent>,
    pub condition: Vec<ConditionEvent>,
}

/// Everything a finished scheduler hands to the aggregator.
#[derive(Debug, Clone)]
pub struct SchedulerOutcome {
    pub state: SchedulerState,
    pub array: ArrayState,
    pub outputs: OutputTables,
    pub tables: SchedulerTables,
    pub environmental: Vec<EnvironmentalRecord>,
    pub costs: PerStrategy<f64>,
    pub log: EventLog,
}

/// One successful dispatch as seen by one component.
struct Booking<'a> {
    strategy: Strategy,
    action_id: Uuid,
    component: &'a ComponentRef,
    mode: usize,
    failure_rate: f64,
    failure_date: NaiveDateTime,
    request_date: NaiveDateTime,
    repair_date: NaiveDateTime,
    downtime_start: NaiveDateTime,
    downtime_hours: f64,
    sea_time_hours: f64,
    waiting_time_hours: f64,
    logistic_cost: f64,
    cost: ActionCost,
    vessel: &'a str,
    devices: &'a [DeviceId],
}

/// Calendar row taking part in a batch.
struct BatchMember {
    index: usize,
    profile: ComponentProfile,
    inspection: ActionRecord,
    devices: Vec<DeviceId>,
}

/// Maintenance scheduler of one replicate.
pub struct MaintenanceScheduler<S: LogisticsSolver> {
    config: SimulationConfig,
    clock: MissionClock,
    catalog: ComponentCatalog,
    site: SiteInfo,
    solver: S,
    costs: CostAccumulator,
    rng: RngManager,
    ids: RngManager,
    array: ArrayState,
    tables: SchedulerTables,
    outputs: OutputTables,
    log: EventLog,
}

impl<S: LogisticsSolver> MaintenanceScheduler<S> {
    /// Build the calendar and condition tables and drop corrective rows
    /// superseded by condition monitoring.
    pub fn new(
        config: SimulationConfig,
        clock: MissionClock,
        model: ArrayModel,
        site: SiteInfo,
        solver: S,
        mut rng: RngManager,
    ) -> Self {
        let mut log = EventLog::new();
        let ids = rng.fork(ACTION_ID_STREAM);

        let calendar = if config.calendar_enabled {
            calendar_table(&model.catalog, &clock, &mut log)
        } else {
            Vec::new()
        };
        let condition = if config.condition_enabled {
            condition_table(&model.catalog, &clock, &mut rng)
        } else {
            Vec::new()
        };
        let mut corrective = if config.corrective_enabled {
            model.corrective
        } else {
            Vec::new()
        };
        remove_superseded(&mut corrective, &condition, clock.start(), &mut log);

        let costs = CostAccumulator::new(CostModel::from_config(&config));

        Self {
            config,
            clock,
            catalog: model.catalog,
            site,
            solver,
            costs,
            rng,
            ids,
            array: model.array,
            tables: SchedulerTables {
                corrective,
                corrective_no_poisson: model.corrective_no_poisson,
                calendar,
                condition,
            },
            outputs: OutputTables::default(),
            log,
        }
    }

    /// Prepend earlier events (e.g. registry diagnostics) to the log.
    pub fn with_log(mut self, mut log: EventLog) -> Self {
        log.extend(std::mem::take(&mut self.log));
        self.log = log;
        self
    }

    pub fn enabled(&self) -> PerStrategy<bool> {
        PerStrategy::new(
            self.config.corrective_enabled,
            self.config.calendar_enabled,
            self.config.condition_enabled,
        )
    }

    pub fn initial_state(&self) -> SchedulerState {
        SchedulerState::new(&self.enabled())
    }

    pub fn clock(&self) -> &MissionClock {
        &self.clock
    }

    pub fn array(&self) -> &ArrayState {
        &self.array
    }

    pub fn tables(&self) -> &SchedulerTables {
        &self.tables
    }

    pub fn outputs(&self) -> &OutputTables {
        &self.outputs
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn costs(&self) -> &CostAccumulator {
        &self.costs
    }

    /// Run the whole replicate: feasibility pre-check (if configured), then
    /// step until every stream is exhausted.
    pub fn run(&mut self) -> Result<SchedulerState, SchedulerError> {
        if self.config.feasibility_check {
            self.feasibility_check()?;
        }

        let mut state = self.initial_state();
        info!(
            corrective = self.tables.corrective.len(),
            calendar = self.tables.calendar.len(),
            condition = self.tables.condition.len(),
            phase = %state.phase,
            "scheduler started"
        );
        while !state.phase.is_done() {
            state = self.step(state)?;
        }
        self.array.finalize_energy(&self.clock);

        info!(
            corrective = state.dispatched.corrective,
            calendar = state.dispatched.calendar,
            condition = state.dispatched.condition,
            turned_off = state.turned_off_devices,
            "scheduler done"
        );
        Ok(state)
    }

    pub fn into_outcome(self, state: SchedulerState) -> SchedulerOutcome {
        let costs = PerStrategy::new(
            self.costs.total(Strategy::Corrective),
            self.costs.total(Strategy::Calendar),
            self.costs.total(Strategy::Condition),
        );
        SchedulerOutcome {
            state,
            array: self.array,
            outputs: self.outputs,
            tables: self.tables,
            environmental: self.costs.into_environmental(),
            costs,
            log: self.log,
        }
    }

    /// Quote one repair per component mode at mission start.
    ///
    /// Quotes become the reference cost of the condition cost/benefit test.
    /// A `NoSolutionsFound` here aborts the replicate before it starts.
    pub fn feasibility_check(&mut self) -> Result<(), SchedulerError> {
        let rows = self.tables.corrective_no_poisson.clone();
        let at = self.clock.start();

        for row in rows {
            let id = &row.component.component_id;
            let profile = self.profile(Strategy::Corrective, id)?.clone();
            let Some(action) = profile.repair(row.mode).cloned() else {
                continue;
            };
            let operation = Operation::classify(profile.reference.kind, &action, false);
            let request = self.request(&profile, row.mode, &action, operation, at);

            let quote = match self.solver.solve(&request) {
                LogisticsOutcome::SolutionFound(solution) => {
                    let spare = spare_of(&profile, row.mode);
                    let cost = self.costs.model().cost(
                        ActionKind::Repair,
                        &spare,
                        crew(&action),
                        solution.departure,
                        solution.sea_time_hours,
                    );
                    let quote = solution.total_cost + cost.total;
                    if let Some(acc) = self.array.component_mut(id) {
                        acc.reference_cost.insert(row.mode, quote);
                    }
                    Some(quote)
                }
                LogisticsOutcome::NoWeatherWindowFound => None,
                LogisticsOutcome::NoSolutionsFound => {
                    warn!(component = %id, mode = row.mode, "feasibility check found no logistics solution");
                    return Err(SchedulerError::NoSolutionsFound {
                        strategy: Strategy::Corrective,
                        component_id: id.clone(),
                        requested: at,
                    });
                }
            };

            self.log.log(Event::FeasibilityQuote {
                at,
                component_id: id.clone(),
                mode: row.mode,
                cost: quote,
            });
        }
        Ok(())
    }

    /// Process the next due row (or calendar batch) and return the new state.
    pub fn step(&mut self, mut state: SchedulerState) -> Result<SchedulerState, SchedulerError> {
        if state.phase.is_done() {
            return Ok(state);
        }

        self.mark_exhausted(&mut state);

        let Some((strategy, due)) = self.next_due(&state) else {
            self.transition(&mut state, SchedulerPhase::Done, self.clock.end());
            self.array.finalize_energy(&self.clock);
            return Ok(state);
        };

        self.transition(&mut state, SchedulerPhase::running(strategy), due);
        match strategy {
            Strategy::Corrective => self.process_corrective(&mut state)?,
            Strategy::Calendar => self.process_calendar(&mut state)?,
            Strategy::Condition => self.process_condition(&mut state)?,
        }
        Ok(state)
    }

    // ========================================================================
    // Stream bookkeeping
    // ========================================================================

    fn due_date(&self, strategy: Strategy, cursor: usize) -> Option<NaiveDateTime> {
        match strategy {
            Strategy::Corrective => self.tables.corrective.get(cursor).map(|r| r.request_date),
            Strategy::Calendar => self.tables.calendar.get(cursor).map(|r| r.start_date),
            Strategy::Condition => self.tables.condition.get(cursor).map(|r| r.alarm_date),
        }
    }

    fn mark_exhausted(&mut self, state: &mut SchedulerState) {
        for strategy in Strategy::ALL {
            if state.exhausted[strategy] {
                continue;
            }
            let exhausted_at = match self.due_date(strategy, state.cursors[strategy]) {
                None => Some(self.clock.end()),
                Some(due) if due > self.clock.end() => Some(self.clock.end()),
                Some(due) if self.array.all_curtailed(strategy) => Some(due),
                Some(_) => None,
            };
            if let Some(at) = exhausted_at {
                state.exhausted[strategy] = true;
                debug!(%strategy, cursor = state.cursors[strategy], "stream exhausted");
                self.log.log(Event::StreamExhausted { at, strategy });
            }
        }
    }

    /// Earliest due stream; ties go calendar, corrective, condition.
    fn next_due(&self, state: &SchedulerState) -> Option<(Strategy, NaiveDateTime)> {
        let mut best: Option<(Strategy, NaiveDateTime)> = None;
        for strategy in [Strategy::Calendar, Strategy::Corrective, Strategy::Condition] {
            if state.exhausted[strategy] {
                continue;
            }
            if let Some(due) = self.due_date(strategy, state.cursors[strategy]) {
                if best.map_or(true, |(_, b)| due < b) {
                    best = Some((strategy, due));
                }
            }
        }
        best
    }

    fn transition(&mut self, state: &mut SchedulerState, to: SchedulerPhase, at: NaiveDateTime) {
        if state.phase == to {
            return;
        }
        debug!(from = %state.phase, to = %to, "phase transition");
        self.log.log(Event::PhaseTransition {
            at,
            from: state.phase,
            to,
        });
        state.phase = to;
    }

    // ========================================================================
    // UnCoMa
    // ========================================================================

    fn process_corrective(&mut self, state: &mut SchedulerState) -> Result<(), SchedulerError> {
        let strategy = Strategy::Corrective;
        let index = state.cursors.corrective;
        let row = self.tables.corrective[index].clone();
        state.cursors.corrective += 1;

        let id = row.component.component_id.clone();
        let profile = self.profile(strategy, &id)?.clone();
        let devices = self.array.affected_devices(&id);
        if self.suppressed(strategy, &id, &devices, row.request_date) {
            return Ok(());
        }
        let Some(action) = profile.repair(row.mode).cloned() else {
            self.skip(strategy, &id, row.request_date, "no repair action");
            return Ok(());
        };

        let requested = not_before(row.request_date, state.last_repair.corrective);
        let operation = Operation::classify(profile.reference.kind, &action, false);
        let request = self.request(&profile, row.mode, &action, operation, requested);

        match self.solver.solve(&request) {
            LogisticsOutcome::SolutionFound(solution) => {
                let repair_date = solution.departure.max(requested);
                let downtime = hours_between(row.failure_date, solution.end).max(0.0);
                let cost = self.costs.charge(
                    strategy,
                    ActionKind::Repair,
                    &spare_of(&profile, row.mode),
                    crew(&action),
                    repair_date,
                    solution.sea_time_hours,
                    solution.total_cost,
                );
                let action_id = self.next_action_id();
                self.book(Booking {
                    strategy,
                    action_id,
                    component: &row.component,
                    mode: row.mode,
                    failure_rate: row.failure_rate,
                    failure_date: row.failure_date,
                    request_date: requested,
                    repair_date,
                    downtime_start: row.failure_date,
                    downtime_hours: downtime,
                    sea_time_hours: solution.sea_time_hours,
                    waiting_time_hours: solution.waiting_time_hours,
                    logistic_cost: solution.total_cost,
                    cost,
                    vessel: &solution.vessel,
                    devices: &devices,
                });
                self.costs.record_vessels(EnvironmentalRecord {
                    action_id,
                    strategy,
                    date: repair_date,
                    vessels: solution.vessels.clone(),
                    duration_hours: solution.sea_time_hours,
                });

                state.last_repair.corrective = Some(repair_date);
                state.total_action_delay_hours += hours_between(row.failure_date, repair_date).max(0.0);
                state.dispatched.corrective += 1;

                self.shift_corrective(index + 1, &id, solution.sea_time_hours, repair_date);
                Ok(())
            }
            LogisticsOutcome::NoWeatherWindowFound => {
                self.no_weather_window(strategy, &row.component, row.mode, requested, &devices, state);
                Ok(())
            }
            LogisticsOutcome::NoSolutionsFound => Err(SchedulerError::NoSolutionsFound {
                strategy,
                component_id: id,
                requested,
            }),
        }
    }

    /// Resolving one failure delays the next ones of the same component.
    fn shift_corrective(&mut self, from: usize, component_id: &str, hours: f64, at: NaiveDateTime) {
        if !(hours > 0.0) {
            return;
        }
        let mut shifted = 0;
        for row in self.tables.corrective.iter_mut().skip(from) {
            if row.component.component_id == component_id {
                row.failure_date = add_hours(row.failure_date, hours);
                row.request_date = add_hours(row.request_date, hours);
                shifted += 1;
            }
        }
        if shifted > 0 {
            self.log.log(Event::CorrectiveShifted {
                at,
                component_id: component_id.to_string(),
                rows: shifted,
                hours,
            });
        }
    }

    // ========================================================================
    // CaBaMa
    // ========================================================================

    fn process_calendar(&mut self, state: &mut SchedulerState) -> Result<(), SchedulerError> {
        let strategy = Strategy::Calendar;
        let first = state.cursors.calendar;
        let opening = self.tables.calendar[first].start_date;
        let limit = self.config.max_parallel_actions.max(1);

        let mut end = first;
        while end < self.tables.calendar.len()
            && end - first < limit
            && self.tables.calendar[end].start_date == opening
        {
            end += 1;
        }
        state.cursors.calendar = end;

        let mut members = Vec::new();
        for index in first..end {
            let row = self.tables.calendar[index].clone();
            let id = row.component.component_id.clone();
            let profile = self.profile(strategy, &id)?.clone();
            let devices = self.array.affected_devices(&id);
            if self.suppressed(strategy, &id, &devices, opening) {
                continue;
            }
            let Some(inspection) = profile.inspection(row.mode).cloned() else {
                self.skip(strategy, &id, opening, "no inspection record");
                continue;
            };
            members.push(BatchMember {
                index,
                profile,
                inspection,
                devices,
            });
        }
        let Some(lead) = members.first() else {
            return Ok(());
        };

        let requested = not_before(opening, state.last_repair.calendar);
        let mode = self.tables.calendar[lead.index].mode;
        let mut request = self.request(
            &lead.profile,
            mode,
            &lead.inspection,
            Operation::InspectionAboveSea,
            requested,
        );
        request.spare = SpareDimensions::default();
        request.on_site_duration_hours = members
            .iter()
            .map(|m| m.inspection.duration_maintenance_hours.max(0.0))
            .sum();
        request.access_duration_hours = members
            .iter()
            .map(|m| m.inspection.duration_access_hours.max(0.0))
            .fold(0.0, f64::max);
        request.technicians = members.iter().map(|m| m.inspection.technicians).max().unwrap_or(0);
        for m in &members {
            request.access_limits = request.access_limits.tightest(&m.inspection.access_limits);
            request.work_limits = request.work_limits.tightest(&m.inspection.work_limits);
        }
        if members.iter().any(|m| m.inspection.requires_divers) {
            request.operation = Operation::InspectionSubsea;
        }

        match self.solver.solve(&request) {
            LogisticsOutcome::SolutionFound(solution) => {
                let repair_date = solution.departure.max(requested);
                let total_duration = request.on_site_duration_hours;
                let count = members.len() as f64;
                let mut batch_id = None;

                for member in &members {
                    let share = if total_duration > 0.0 {
                        member.inspection.duration_maintenance_hours.max(0.0) / total_duration
                    } else {
                        1.0 / count
                    };
                    let sea_time = solution.sea_time_hours * share;
                    let logistic = solution.total_cost * share;
                    let cost = self.costs.charge(
                        strategy,
                        ActionKind::Inspection,
                        &SpareSpec::default(),
                        crew(&member.inspection),
                        repair_date,
                        sea_time,
                        logistic,
                    );
                    let action_id = self.next_action_id();
                    batch_id.get_or_insert(action_id);

                    let row = self.tables.calendar[member.index].clone();
                    self.book(Booking {
                        strategy,
                        action_id,
                        component: &row.component,
                        mode: row.mode,
                        failure_rate: row.failure_rate,
                        failure_date: row.start_date,
                        request_date: requested,
                        repair_date,
                        downtime_start: repair_date,
                        downtime_hours: sea_time,
                        sea_time_hours: sea_time,
                        waiting_time_hours: solution.waiting_time_hours,
                        logistic_cost: logistic,
                        cost,
                        vessel: &solution.vessel,
                        devices: &member.devices,
                    });

                    let executed = &mut self.tables.calendar[member.index];
                    executed.action_start = Some(repair_date);
                    executed.action_end = Some(solution.end);
                    executed.logistic_cost = Some(logistic);
                    executed.om_cost = Some(cost.total);
                }

                if let Some(action_id) = batch_id {
                    self.costs.record_vessels(EnvironmentalRecord {
                        action_id,
                        strategy,
                        date: repair_date,
                        vessels: solution.vessels.clone(),
                        duration_hours: solution.sea_time_hours,
                    });
                }
                state.last_repair.calendar = Some(repair_date);
                state.dispatched.calendar += 1;
                Ok(())
            }
            LogisticsOutcome::NoWeatherWindowFound => {
                for member in &members {
                    let mode = self.tables.calendar[member.index].mode;
                    let component = member.profile.reference.clone();
                    self.no_weather_window(strategy, &component, mode, requested, &member.devices, state);
                }
                Ok(())
            }
            LogisticsOutcome::NoSolutionsFound => Err(SchedulerError::NoSolutionsFound {
                strategy,
                component_id: lead.profile.id().to_string(),
                requested,
            }),
        }
    }

    // ========================================================================
    // CoBaMa
    // ========================================================================

    fn process_condition(&mut self, state: &mut SchedulerState) -> Result<(), SchedulerError> {
        let strategy = Strategy::Condition;
        let index = state.cursors.condition;
        let row = self.tables.condition[index].clone();
        state.cursors.condition += 1;

        let id = row.component.component_id.clone();
        let profile = self.profile(strategy, &id)?.clone();
        let devices = self.array.affected_devices(&id);
        if self.suppressed(strategy, &id, &devices, row.alarm_date) {
            return Ok(());
        }
        let Some(action) = profile.repair(row.mode).cloned() else {
            self.skip(strategy, &id, row.alarm_date, "no repair action");
            return Ok(());
        };

        if self.config.calendar_enabled && !row.preempted_by_calendar {
            if let Some(calendar_date) = self.upcoming_calendar(state.cursors.calendar, &id, row.alarm_date) {
                let wait = hours_between(row.alarm_date, calendar_date);
                let lost = self.lost_energy_value(row.failure_rate, wait, &devices);
                let repair_cost = self.reference_cost(&profile, row.mode, &action, row.alarm_date);
                if lost < repair_cost {
                    debug!(component = %id, lost, repair_cost, "condition alarm left to calendar action");
                    self.tables.condition[index].preempted_by_calendar = true;
                    self.log.log(Event::DeferredToCalendar {
                        at: row.alarm_date,
                        component_id: id.clone(),
                        mode: row.mode,
                        calendar_date,
                        lost_energy_value: lost,
                        repair_cost,
                    });
                    self.schedule_next_alarm(index + 1, &row, calendar_date);
                    return Ok(());
                }
            }
        }

        let mut requested = row.alarm_date;
        if let Some(months) = profile.condition.and_then(|w| w.months()) {
            requested = shift_into_window(requested, months);
        }
        let requested = not_before(requested, state.last_repair.condition);
        let operation = Operation::classify(profile.reference.kind, &action, false);
        let request = self.request(&profile, row.mode, &action, operation, requested);

        match self.solver.solve(&request) {
            LogisticsOutcome::SolutionFound(solution) => {
                let repair_date = solution.departure.max(requested);
                let downtime = hours_between(repair_date, solution.end).max(0.0);
                let cost = self.costs.charge(
                    strategy,
                    ActionKind::Repair,
                    &spare_of(&profile, row.mode),
                    crew(&action),
                    repair_date,
                    solution.sea_time_hours,
                    solution.total_cost,
                );
                let action_id = self.next_action_id();
                self.book(Booking {
                    strategy,
                    action_id,
                    component: &row.component,
                    mode: row.mode,
                    failure_rate: row.failure_rate,
                    failure_date: row.alarm_date,
                    request_date: requested,
                    repair_date,
                    downtime_start: repair_date,
                    downtime_hours: downtime,
                    sea_time_hours: solution.sea_time_hours,
                    waiting_time_hours: solution.waiting_time_hours,
                    logistic_cost: solution.total_cost,
                    cost,
                    vessel: &solution.vessel,
                    devices: &devices,
                });
                self.costs.record_vessels(EnvironmentalRecord {
                    action_id,
                    strategy,
                    date: repair_date,
                    vessels: solution.vessels.clone(),
                    duration_hours: solution.sea_time_hours,
                });

                state.last_repair.condition = Some(repair_date);
                state.dispatched.condition += 1;
                self.schedule_next_alarm(index + 1, &row, solution.end);
                Ok(())
            }
            LogisticsOutcome::NoWeatherWindowFound => {
                self.no_weather_window(strategy, &row.component, row.mode, requested, &devices, state);
                Ok(())
            }
            LogisticsOutcome::NoSolutionsFound => Err(SchedulerError::NoSolutionsFound {
                strategy,
                component_id: id,
                requested,
            }),
        }
    }

    /// Opening of the next unprocessed calendar action of the component
    /// within the look-ahead after `alarm`.
    fn upcoming_calendar(&self, from: usize, component_id: &str, alarm: NaiveDateTime) -> Option<NaiveDateTime> {
        let horizon = add_hours(alarm, self.config.condition_lookahead_days as f64 * 24.0);
        self.tables
            .calendar
            .iter()
            .skip(from)
            .filter(|r| r.component.component_id == component_id)
            .map(|r| r.start_date)
            .find(|d| *d > alarm && *d <= horizon)
    }

    /// Expected value of the energy lost by waiting `wait_hours`: the
    /// failure probability over the wait times half the wait (mean outage
    /// if it fails) times the power of the affected devices.
    fn lost_energy_value(&self, annual_rate: f64, wait_hours: f64, devices: &[DeviceId]) -> f64 {
        let wait = wait_hours.max(0.0);
        let p_fail = 1.0 - (-(annual_rate / HOURS_PER_YEAR) * wait).exp();
        let power_mw: f64 = devices
            .iter()
            .filter_map(|d| self.array.device(d))
            .map(|d| d.annual_energy_mwh / HOURS_PER_YEAR)
            .sum();
        p_fail * wait / 2.0 * power_mw * self.config.energy_price_per_mwh
    }

    /// Quoted cost of a repair now; estimated from spare and labour when the
    /// pre-check produced no quote.
    fn reference_cost(
        &self,
        profile: &ComponentProfile,
        mode: usize,
        action: &ActionRecord,
        at: NaiveDateTime,
    ) -> f64 {
        self.array
            .component(profile.id())
            .and_then(|c| c.reference_cost.get(&mode).copied())
            .unwrap_or_else(|| {
                let hours = action.duration_access_hours + action.duration_maintenance_hours;
                self.costs
                    .model()
                    .cost(ActionKind::Repair, &spare_of(profile, mode), crew(action), at, hours)
                    .total
            })
    }

    /// Insert the alarm following a renewal at `renewal` into the unprocessed
    /// part of the table, keeping it sorted. Alarms past the mission are dropped.
    fn schedule_next_alarm(&mut self, from: usize, row: &ConditionEvent, renewal: NaiveDateTime) {
        let alarm = next_alarm(
            renewal,
            row.failure_rate,
            row.soh_threshold_pct,
            &self.clock,
            &mut self.rng,
        );
        if alarm > self.clock.end() {
            return;
        }
        let from = from.min(self.tables.condition.len());
        let offset = self.tables.condition[from..].partition_point(|r| r.alarm_date <= alarm);
        self.tables.condition.insert(
            from + offset,
            ConditionEvent {
                renewal_date: renewal,
                alarm_date: alarm,
                preempted_by_calendar: false,
                ..row.clone()
            },
        );
    }

    // ========================================================================
    // Shared dispatch helpers
    // ========================================================================

    fn profile(&self, strategy: Strategy, component_id: &str) -> Result<&ComponentProfile, SchedulerError> {
        self.catalog
            .profile(component_id)
            .ok_or_else(|| SchedulerError::UnknownComponent {
                strategy,
                component_id: component_id.to_string(),
            })
    }

    fn request(
        &self,
        profile: &ComponentProfile,
        mode: usize,
        action: &ActionRecord,
        operation: Operation,
        requested: NaiveDateTime,
    ) -> LogisticsRequest {
        let location = &profile.location;
        LogisticsRequest {
            component_id: profile.id().to_string(),
            mode,
            operation,
            component_kind: profile.reference.kind,
            component_subtype: profile.reference.subtype.clone(),
            depth_m: location.depth_m,
            x: location.x,
            y: location.y,
            zone: location.zone.clone(),
            soil_type: location.soil_type.clone(),
            bathymetry_m: self.site.bathymetry_m.unwrap_or(location.depth_m),
            requested,
            access_duration_hours: action.duration_access_hours,
            on_site_duration_hours: action.duration_maintenance_hours,
            helideck_available: self.site.helideck_available,
            access_limits: action.access_limits,
            work_limits: action.work_limits,
            technicians: action.technicians,
            spare: profile
                .mode(mode)
                .map(|m| SpareDimensions::from(&m.spare))
                .unwrap_or_default(),
            port_distance_km: self.site.port_distance_km,
            port_index: self.site.port_index,
            prep_time_hours: self.config.prep_time_hours,
        }
    }

    /// Skip the row when every affected device is already curtailed.
    fn suppressed(&mut self, strategy: Strategy, component_id: &str, devices: &[DeviceId], at: NaiveDateTime) -> bool {
        if !self.array.devices_curtailed(devices, strategy) {
            return false;
        }
        self.skip(strategy, component_id, at, "affected devices curtailed");
        true
    }

    fn skip(&mut self, strategy: Strategy, component_id: &str, at: NaiveDateTime, reason: &str) {
        debug!(%strategy, component = %component_id, reason, "row skipped");
        self.log.log(Event::ActionSkipped {
            at,
            strategy,
            component_id: component_id.to_string(),
            reason: reason.to_string(),
        });
    }

    fn book(&mut self, booking: Booking<'_>) {
        let component_id = &booking.component.component_id;

        if let Some(acc) = self.array.component_mut(component_id) {
            let ledger = &mut acc.ledgers[booking.strategy];
            ledger.costs.push(CostEntry {
                action_id: booking.action_id,
                date: booking.repair_date,
                mode: booking.mode,
                logistic: booking.logistic_cost,
                labour: booking.cost.labour,
                spare: booking.cost.spare,
            });
            ledger.logistics.push(LogisticEntry {
                action_id: booking.action_id,
                vessel: booking.vessel.to_string(),
                sea_time_hours: booking.sea_time_hours,
                waiting_time_hours: booking.waiting_time_hours,
            });
        }

        for device_id in booking.devices {
            if let Some(device) = self.array.device_mut(device_id) {
                device.record_downtime(
                    booking.strategy,
                    DowntimeEntry {
                        start: booking.downtime_start,
                        duration_hours: booking.downtime_hours,
                        mode: booking.mode,
                        component_id: component_id.clone(),
                    },
                );
            }
            self.outputs.table_mut(booking.strategy).push(MaintenanceRecord {
                action_id: booking.action_id,
                strategy: booking.strategy,
                device_id: device_id.clone(),
                affected_devices: booking.devices.to_vec(),
                component_id: component_id.clone(),
                component_subtype: booking.component.subtype.clone(),
                mode: booking.mode,
                failure_rate: booking.failure_rate,
                failure_date: booking.failure_date,
                request_date: booking.request_date,
                repair_date: booking.repair_date,
                downtime_hours: booking.downtime_hours,
                sea_time_hours: booking.sea_time_hours,
                waiting_time_hours: booking.waiting_time_hours,
                cost_logistic: booking.logistic_cost,
                cost_labour: booking.cost.labour,
                cost_spare: booking.cost.spare,
                vessel: booking.vessel.to_string(),
            });
        }

        debug!(
            strategy = %booking.strategy,
            component = %component_id,
            repair_date = %booking.repair_date,
            "action dispatched"
        );
        self.log.log(Event::ActionDispatched {
            at: booking.repair_date,
            strategy: booking.strategy,
            action_id: booking.action_id,
            component_ids: vec![component_id.clone()],
            devices: booking.devices.to_vec(),
            sea_time_hours: booking.sea_time_hours,
            total_cost: booking.logistic_cost + booking.cost.total,
        });
    }

    /// Book the affected devices as down until the mission end and, when
    /// configured, switch them off for the rest of the strategy.
    fn no_weather_window(
        &mut self,
        strategy: Strategy,
        component: &ComponentRef,
        mode: usize,
        at: NaiveDateTime,
        devices: &[DeviceId],
        state: &mut SchedulerState,
    ) {
        let component_id = &component.component_id;
        if let Some(acc) = self.array.component_mut(component_id) {
            acc.ledgers[strategy].no_weather_window = true;
        }

        let down_hours = hours_between(at, self.clock.end()).max(0.0);
        for device_id in devices {
            let Some(device) = self.array.device_mut(device_id) else {
                continue;
            };
            device.record_downtime(
                strategy,
                DowntimeEntry {
                    start: at,
                    duration_hours: down_hours,
                    mode,
                    component_id: component_id.clone(),
                },
            );
            if self.config.curtail_devices && !device.curtailed[strategy] {
                device.curtailed[strategy] = true;
                state.turned_off_devices += 1;
                self.log.log(Event::DeviceCurtailed {
                    at,
                    strategy,
                    device_id: device_id.clone(),
                });
            }
        }

        warn!(%strategy, component = %component_id, at = %at, "no weather window");
        self.log.log(Event::NoWeatherWindow {
            at,
            strategy,
            component_id: component_id.clone(),
            devices: devices.to_vec(),
        });
    }

    fn next_action_id(&mut self) -> Uuid {
        let high = u128::from(self.ids.next()) << 64;
        let bits = high | u128::from(self.ids.next());
        Builder::from_random_bytes(bits.to_le_bytes()).into_uuid()
    }
}

/// Remove corrective rows of (component, mode) pairs under condition monitoring.
fn remove_superseded(
    corrective: &mut Vec<CorrectiveEvent>,
    condition: &[ConditionEvent],
    at: NaiveDateTime,
    log: &mut EventLog,
) {
    let monitored: BTreeSet<(&str, usize)> = condition
        .iter()
        .map(|r| (r.component.component_id.as_str(), r.mode))
        .collect();
    if monitored.is_empty() {
        return;
    }

    for (component_id, mode) in &monitored {
        let before = corrective.len();
        corrective.retain(|r| !(r.component.component_id == *component_id && r.mode == *mode));
        let removed = before - corrective.len();
        if removed > 0 {
            debug!(component = %component_id, mode, removed, "corrective rows superseded");
            log.log(Event::CorrectiveSuperseded {
                at,
                component_id: component_id.to_string(),
                mode: *mode,
                removed,
            });
        }
    }
}

fn not_before(date: NaiveDateTime, last: Option<NaiveDateTime>) -> NaiveDateTime {
    last.map_or(date, |l| date.max(l))
}

fn crew(action: &ActionRecord) -> Crew {
    Crew {
        technicians: action.technicians,
        specialists: action.specialists,
    }
}

fn spare_of(profile: &ComponentProfile, mode: usize) -> SpareSpec {
    profile.mode(mode).map(|m| m.spare.clone()).unwrap_or_default()
}
