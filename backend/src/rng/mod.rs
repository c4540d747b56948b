//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm. Every stochastic draw in a replicate
//! (failure processes, condition alarms) goes through this module so that
//! one seed reproduces one replicate.

mod xorshift;

pub use xorshift::RngManager;
