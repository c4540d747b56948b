//! Single-replicate pipeline
//!
//! registry build → scheduler run → aggregation, all driven by one seed.
//! Replicates share no mutable state, so an outer driver may run them on
//! separate workers; a replicate aborted by `NoSolutionsFound` does not
//! affect the others.

use crate::config::{compute_config_hash, ConfigError, Scenario};
use crate::core::time::MissionClock;
use crate::failure::FailureProcessSampler;
use crate::logistics::{LogisticsSolver, TabularLogistics};
use crate::models::event::EventLog;
use crate::registry::{ComponentRegistry, RegistryError, RegistryInput};
use crate::report::{AvailabilityEnergyAggregator, ReplicateSummary};
use crate::rng::RngManager;
use crate::scheduler::{MaintenanceScheduler, SchedulerError, SchedulerOutcome};
use thiserror::Error;
use tracing::info;

const REGISTRY_STREAM: u64 = 0;
const SCHEDULER_STREAM: u64 = 1;

/// Errors that abort one replicate
#[derive(Debug, Error)]
pub enum ReplicateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl ReplicateError {
    /// True when logistics reported that no configuration can serve a request.
    pub fn is_no_solutions_found(&self) -> bool {
        matches!(
            self,
            ReplicateError::Scheduler(SchedulerError::NoSolutionsFound { .. })
        )
    }
}

/// Summary plus the full scheduler outcome of one replicate.
#[derive(Debug, Clone)]
pub struct ReplicateResult {
    pub summary: ReplicateSummary,
    pub outcome: SchedulerOutcome,
}

/// Seed of replicate `index` derived from a base seed.
pub fn replicate_seed(base_seed: u64, index: u64) -> u64 {
    RngManager::new(base_seed).fork(index).next()
}

/// Run one replicate of `scenario` with the given logistics solver.
pub fn run_replicate<S: LogisticsSolver>(
    scenario: &Scenario,
    seed: u64,
    solver: S,
) -> Result<ReplicateResult, ReplicateError> {
    let config = &scenario.config;
    config.validate()?;

    let clock = MissionClock::new(config.start_date, config.mission_years);
    let mut rng = RngManager::new(seed);
    let mut registry_rng = rng.fork(REGISTRY_STREAM);
    let scheduler_rng = rng.fork(SCHEDULER_STREAM);

    let registry = ComponentRegistry::new(clock, FailureProcessSampler::new(config.sampler.clone()));
    let mut log = EventLog::new();
    let model = registry.build(
        RegistryInput {
            reliability: &scenario.reliability,
            components: &scenario.components,
            failure_modes: &scenario.failure_modes,
            repair_actions: &scenario.repair_actions,
            inspections: &scenario.inspections,
            devices: &scenario.devices,
        },
        &mut registry_rng,
        &mut log,
    )?;

    let mut scheduler = MaintenanceScheduler::new(
        config.clone(),
        clock,
        model,
        scenario.site.clone(),
        solver,
        scheduler_rng,
    )
    .with_log(log);
    let state = scheduler.run()?;
    let outcome = scheduler.into_outcome(state);

    let config_hash = compute_config_hash(config)?;
    let summary = AvailabilityEnergyAggregator::new(clock).aggregate(&outcome, seed, config_hash);

    info!(
        seed,
        availability = summary.array_availability,
        opex = summary.total_opex(),
        "replicate finished"
    );
    Ok(ReplicateResult { summary, outcome })
}

/// Run one replicate with the scenario's tabular logistics settings.
pub fn run_replicate_tabular(scenario: &Scenario, seed: u64) -> Result<ReplicateResult, ReplicateError> {
    let clock = MissionClock::new(scenario.config.start_date, scenario.config.mission_years);
    let solver = TabularLogistics::new(scenario.logistics.clone(), clock.end());
    run_replicate(scenario, seed, solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_no_solutions_found_is_recognised() {
        let err = ReplicateError::from(SchedulerError::NoSolutionsFound {
            strategy: crate::models::Strategy::Corrective,
            component_id: "pto001".to_string(),
            requested: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        });
        assert!(err.is_no_solutions_found());
        assert!(!ReplicateError::from(RegistryError::NoDevices).is_no_solutions_found());
    }

    #[test]
    fn test_replicate_seeds_differ() {
        assert_ne!(replicate_seed(42, 0), replicate_seed(42, 1));
        assert_eq!(replicate_seed(42, 3), replicate_seed(42, 3));
    }
}
