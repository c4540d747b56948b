//! Core time handling shared by every stage of a replicate

pub mod time;
