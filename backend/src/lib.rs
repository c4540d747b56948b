//! Offshore O&M Simulator Core - Rust Engine
//!
//! Event-generation and maintenance-scheduling engine for offshore
//! renewable-energy arrays: when components fail, which maintenance
//! strategy resolves each failure, and what it costs in vessel time,
//! labour, spares and lost energy.
//!
//! # Architecture
//!
//! - **core**: Mission calendar
//! - **rng**: Deterministic random number generation
//! - **failure**: Percentile-filtered failure-process sampler
//! - **models**: Domain types (records, RAM table, array state, event tables)
//! - **registry**: Array builder (per-component profiles and accumulators)
//! - **logistics**: Logistics solver interface and tabular solver
//! - **costs**: Labour/spare cost and environmental records
//! - **scheduler**: Three-stream maintenance state machine
//! - **report**: Availability, energy and OPEX aggregation
//! - **replicate**: Single-replicate pipeline
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG, one seed per replicate)
//! 2. Only the scheduler mutates array state; replicates share nothing
//! 3. `NoSolutionsFound` aborts a replicate; every other input problem is
//!    absorbed per component and logged

// Module declarations
pub mod config;
pub mod core;
pub mod costs;
pub mod failure;
pub mod logistics;
pub mod models;
pub mod registry;
pub mod replicate;
pub mod report;
pub mod rng;
pub mod scheduler;

// Re-exports for convenience
pub use config::{compute_config_hash, ConfigError, Scenario, SimulationConfig};
pub use core::time::MissionClock;
pub use costs::{CostAccumulator, CostModel, EnvironmentalRecord};
pub use failure::{FailureProcessSampler, SamplerConfig};
pub use logistics::{LogisticsOutcome, LogisticsRequest, LogisticsSolver, TabularLogistics};
pub use models::{
    event::{Event, EventLog},
    state::ArrayState,
    strategy::{PerStrategy, Strategy},
};
pub use registry::{ArrayModel, ComponentRegistry, RegistryError};
pub use replicate::{run_replicate, run_replicate_tabular, ReplicateError, ReplicateResult};
pub use report::{AvailabilityEnergyAggregator, ReplicateSummary};
pub use rng::RngManager;
pub use scheduler::{MaintenanceScheduler, SchedulerError, SchedulerPhase, SchedulerState};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn om_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulator::PySimulator>()?;
    m.add_function(wrap_pyfunction!(ffi::simulator::run_replicate, m)?)?;
    Ok(())
}
