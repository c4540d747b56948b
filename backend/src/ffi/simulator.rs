//! PyO3 wrapper around the replicate pipeline

use pyo3::prelude::*;

use super::types::{config_error_to_py, replicate_error_to_py, summary_to_json};
use crate::config::{compute_config_hash, Scenario};
use crate::replicate::{replicate_seed, run_replicate_tabular};

/// Parsed scenario ready to run replicates.
///
/// # Example (from Python)
///
/// ```python
/// import json
/// from om_simulator_core_rs import Simulator
///
/// sim = Simulator.from_json(open("scenario.json").read())
/// summary = json.loads(sim.run_replicate(0))
/// print(summary["array_availability"])
/// ```
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    scenario: Scenario,
}

#[pymethods]
impl PySimulator {
    /// Parse and validate a scenario; raises ValueError when invalid.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let scenario = Scenario::from_json(json).map_err(config_error_to_py)?;
        Ok(Self { scenario })
    }

    /// Run replicate `index` (seed derived from the scenario base seed)
    /// and return its summary as JSON.
    fn run_replicate(&self, index: u64) -> PyResult<String> {
        let seed = replicate_seed(self.scenario.config.rng_seed, index);
        let result = run_replicate_tabular(&self.scenario, seed).map_err(replicate_error_to_py)?;
        summary_to_json(&result.summary)
    }

    fn config_hash(&self) -> PyResult<String> {
        compute_config_hash(&self.scenario.config).map_err(config_error_to_py)
    }

    fn num_components(&self) -> usize {
        self.scenario.components.len()
    }
}

/// Run one replicate of a JSON scenario with an explicit seed.
#[pyfunction]
pub fn run_replicate(scenario_json: &str, seed: u64) -> PyResult<String> {
    let scenario = Scenario::from_json(scenario_json).map_err(config_error_to_py)?;
    let result = run_replicate_tabular(&scenario, seed).map_err(replicate_error_to_py)?;
    summary_to_json(&result.summary)
}
