//! Python bindings (feature `pyo3`)
//!
//! The boundary is JSON in, JSON out: a scenario document goes in, a
//! replicate summary comes back. No Rust object crosses except the
//! `Simulator` handle holding a parsed scenario.

pub mod simulator;
pub mod types;
