//! Conversions at the FFI boundary

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::PyErr;

use crate::config::ConfigError;
use crate::replicate::ReplicateError;
use crate::report::ReplicateSummary;

/// Configuration problems surface as `ValueError`, aborted replicates as
/// `RuntimeError` (prefixed `NoSolutionsFound:` when logistics had no solution).
pub fn replicate_error_to_py(err: ReplicateError) -> PyErr {
    match err {
        ReplicateError::Config(e) => config_error_to_py(e),
        e if e.is_no_solutions_found() => PyRuntimeError::new_err(format!("NoSolutionsFound: {}", e)),
        e => PyRuntimeError::new_err(e.to_string()),
    }
}

pub fn config_error_to_py(err: ConfigError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

pub fn summary_to_json(summary: &ReplicateSummary) -> Result<String, PyErr> {
    serde_json::to_string(summary).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}
