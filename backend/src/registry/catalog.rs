//! Resolved per-component profiles
//!
//! Everything the scheduler needs to know about a component that never
//! changes during a replicate: identity, resolved failure rate, failure
//! modes, actions, maintenance windows and position.

use crate::models::component::{
    ActionRecord, CalendarWindow, ComponentId, ConditionWindow, DeviceId, DeviceRecord,
    FailureModeRecord,
};
use crate::models::tables::ComponentRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a component's failure rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Reliability-network row(s)
    Network,
    /// Static component table
    Fallback,
}

/// Position data handed to logistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub zone: String,
    pub depth_m: f64,
    pub soil_type: String,
}

impl From<&DeviceRecord> for Location {
    fn from(device: &DeviceRecord) -> Self {
        Self {
            x: device.x,
            y: device.y,
            zone: device.zone.clone(),
            depth_m: device.depth_m,
            soil_type: device.soil_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentProfile {
    pub reference: ComponentRef,
    /// Resolved annual failure rate
    pub failure_rate: f64,
    pub rate_source: RateSource,
    /// Failure modes ordered by mode index
    pub modes: Vec<FailureModeRecord>,
    pub repairs: BTreeMap<usize, ActionRecord>,
    pub inspections: BTreeMap<usize, ActionRecord>,
    /// `None` when absent or malformed
    pub calendar: Option<CalendarWindow>,
    pub condition: Option<ConditionWindow>,
    pub floating: bool,
    pub location: Location,
}

impl ComponentProfile {
    pub fn id(&self) -> &str {
        &self.reference.component_id
    }

    pub fn mode(&self, mode: usize) -> Option<&FailureModeRecord> {
        self.modes.iter().find(|m| m.mode == mode)
    }

    /// Annual failure rate carried by `mode`.
    pub fn mode_failure_rate(&self, mode: &FailureModeRecord) -> f64 {
        self.failure_rate * mode.probability_pct / 100.0
    }

    pub fn repair(&self, mode: usize) -> Option<&ActionRecord> {
        self.repairs.get(&mode)
    }

    pub fn inspection(&self, mode: usize) -> Option<&ActionRecord> {
        self.inspections.get(&mode)
    }

    /// Hours between a failure and the earliest repair request: crew and
    /// organisation delays run in parallel with the spare lead time.
    pub fn request_delay_hours(&self, mode: usize) -> f64 {
        let crew = self
            .repair(mode)
            .map(|a| a.delay_crew_hours.max(0.0) + a.delay_organisation_hours.max(0.0))
            .unwrap_or(0.0);
        let lead = self
            .mode(mode)
            .map(|m| m.spare.lead_time_hours.max(0.0))
            .unwrap_or(0.0);
        crew.max(lead)
    }
}

/// Immutable profile and device tables of one replicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentCatalog {
    profiles: BTreeMap<ComponentId, ComponentProfile>,
    devices: BTreeMap<DeviceId, DeviceRecord>,
}

impl ComponentCatalog {
    pub(crate) fn insert_profile(&mut self, profile: ComponentProfile) -> bool {
        if self.profiles.contains_key(profile.id()) {
            return false;
        }
        self.profiles.insert(profile.id().to_string(), profile);
        true
    }

    pub(crate) fn insert_device(&mut self, device: DeviceRecord) {
        self.devices.entry(device.id.clone()).or_insert(device);
    }

    pub fn profile(&self, id: &str) -> Option<&ComponentProfile> {
        self.profiles.get(id)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ComponentProfile> {
        self.profiles.values()
    }

    pub fn device(&self, id: &str) -> Option<&DeviceRecord> {
        self.devices.get(id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
