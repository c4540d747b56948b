//! Static component, failure-mode, action and device records
//!
//! These tables are loaded once per scenario and never mutated. Free-form
//! type strings from the input are resolved into [`ComponentKind`] and
//! [`Owner`] exactly once, when the registry builds its profiles.

use serde::{Deserialize, Serialize};

pub type ComponentId = String;
pub type DeviceId = String;

/// What a component physically is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Hydrodynamic,
    Pto,
    Control,
    SupportStructure,
    MooringLine,
    Foundation,
    DynamicCable,
    Subhub,
    ArrayCable,
    ExportCable,
    Substation,
    Other,
}

impl ComponentKind {
    /// Resolve the kind from the input subtype and owner.
    ///
    /// # Example
    /// ```
    /// use om_simulator_core_rs::models::{ComponentKind, Owner};
    ///
    /// let owner = Owner::parse("device001");
    /// assert_eq!(ComponentKind::resolve(&owner, "Mooring line"), ComponentKind::MooringLine);
    /// assert_eq!(ComponentKind::resolve(&Owner::parse("subhub001"), "hub"), ComponentKind::Subhub);
    /// ```
    pub fn resolve(owner: &Owner, subtype: &str) -> ComponentKind {
        if matches!(owner, Owner::Subhub(_)) {
            return ComponentKind::Subhub;
        }
        match subtype.trim().to_ascii_lowercase().as_str() {
            "hydrodynamic" => ComponentKind::Hydrodynamic,
            "pto" | "power take-off" => ComponentKind::Pto,
            "control" => ComponentKind::Control,
            "support structure" => ComponentKind::SupportStructure,
            "mooring line" => ComponentKind::MooringLine,
            "foundation" => ComponentKind::Foundation,
            "dynamic cable" | "umbilical" => ComponentKind::DynamicCable,
            "array cable" | "inter-array cable" | "array elec sub-system" => ComponentKind::ArrayCable,
            "export cable" => ComponentKind::ExportCable,
            "substation" => ComponentKind::Substation,
            _ => ComponentKind::Other,
        }
    }

    /// Mooring and foundation subtypes share one network failure rate.
    pub fn is_mooring_foundation(&self) -> bool {
        matches!(
            self,
            ComponentKind::MooringLine | ComponentKind::Foundation | ComponentKind::DynamicCable
        )
    }

    /// Electrical infrastructure serving the whole array.
    pub fn is_array_infrastructure(&self) -> bool {
        matches!(
            self,
            ComponentKind::ArrayCable | ComponentKind::ExportCable | ComponentKind::Substation
        )
    }
}

/// Which part of the farm a component belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Shared array infrastructure
    Array,
    /// An electrical subhub
    Subhub(String),
    /// A single device
    Device(DeviceId),
}

impl Owner {
    /// Parse the input `component_type` column ("Array", "subhub001", "device001").
    pub fn parse(raw: &str) -> Owner {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower == "array" {
            Owner::Array
        } else if lower.starts_with("subhub") {
            Owner::Subhub(trimmed.to_string())
        } else {
            Owner::Device(trimmed.to_string())
        }
    }

    /// Identifier used as the RAM-table owner key
    pub fn key(&self) -> &str {
        match self {
            Owner::Array => "Array",
            Owner::Subhub(id) | Owner::Device(id) => id,
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        match self {
            Owner::Device(id) => Some(id),
            _ => None,
        }
    }
}

/// Recurring calendar maintenance window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub start_month: u32,
    pub end_month: u32,
    pub interval_years: u32,
}

impl CalendarWindow {
    pub fn validate(&self) -> Result<(), String> {
        validate_month("start_month", self.start_month)?;
        validate_month("end_month", self.end_month)?;
        if self.interval_years == 0 {
            return Err("interval_years must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Condition-monitoring window and state-of-health alarm threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionWindow {
    #[serde(default)]
    pub start_month: Option<u32>,
    #[serde(default)]
    pub end_month: Option<u32>,
    /// Health (%) at which the alarm fires; strictly between 0 and 100
    pub soh_threshold_pct: f64,
}

impl ConditionWindow {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(m) = self.start_month {
            validate_month("start_month", m)?;
        }
        if let Some(m) = self.end_month {
            validate_month("end_month", m)?;
        }
        if self.start_month.is_some() != self.end_month.is_some() {
            return Err("start_month and end_month must be given together".to_string());
        }
        if !(self.soh_threshold_pct > 0.0 && self.soh_threshold_pct < 100.0) {
            return Err(format!(
                "soh_threshold_pct {} outside (0, 100)",
                self.soh_threshold_pct
            ));
        }
        Ok(())
    }

    /// Month range during which condition actions may start, if restricted.
    pub fn months(&self) -> Option<(u32, u32)> {
        self.start_month.zip(self.end_month)
    }
}

fn validate_month(name: &str, month: u32) -> Result<(), String> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(format!("{} {} outside 1..=12", name, month))
    }
}

/// Static component record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: ComponentId,
    /// Raw owner column: "Array", "subhubNNN" or a device id
    pub component_type: String,
    pub component_subtype: String,
    /// Base failure rate (1/year), used when the network has no matching row
    pub failure_rate: f64,
    #[serde(default)]
    pub failure_mode_count: Option<usize>,
    #[serde(default)]
    pub calendar: Option<CalendarWindow>,
    #[serde(default)]
    pub condition: Option<ConditionWindow>,
    #[serde(default)]
    pub floating: bool,
}

/// Spare part needed by a failure mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpareSpec {
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub mass_kg: f64,
    pub cost: f64,
    #[serde(default)]
    pub cost_transit: Option<f64>,
    #[serde(default)]
    pub cost_loading: Option<f64>,
    #[serde(default)]
    pub lead_time_hours: f64,
}

impl SpareSpec {
    /// `cost + transit + loading`, missing parts counting as zero.
    pub fn total_cost(&self) -> f64 {
        self.cost + self.cost_transit.unwrap_or(0.0) + self.cost_loading.unwrap_or(0.0)
    }
}

/// Failure mode of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureModeRecord {
    pub component_id: ComponentId,
    /// 1-based index of the mode within its component
    pub mode: usize,
    /// Share of the component failure rate carried by this mode (%)
    pub probability_pct: f64,
    #[serde(default)]
    pub spare: SpareSpec,
}

/// Environmental operating limits of one phase of an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetOceanLimits {
    pub max_hs_m: f64,
    pub max_tp_s: f64,
    pub max_wind_ms: f64,
    pub max_current_ms: f64,
}

impl Default for MetOceanLimits {
    fn default() -> Self {
        Self {
            max_hs_m: f64::MAX,
            max_tp_s: f64::MAX,
            max_wind_ms: f64::MAX,
            max_current_ms: f64::MAX,
        }
    }
}

impl MetOceanLimits {
    /// Element-wise most restrictive of two limit sets
    pub fn tightest(&self, other: &MetOceanLimits) -> MetOceanLimits {
        MetOceanLimits {
            max_hs_m: self.max_hs_m.min(other.max_hs_m),
            max_tp_s: self.max_tp_s.min(other.max_tp_s),
            max_wind_ms: self.max_wind_ms.min(other.max_wind_ms),
            max_current_ms: self.max_current_ms.min(other.max_current_ms),
        }
    }
}

/// Repair action or inspection for one (component, failure mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub component_id: ComponentId,
    pub mode: usize,
    pub duration_maintenance_hours: f64,
    #[serde(default)]
    pub duration_access_hours: f64,
    #[serde(default)]
    pub delay_crew_hours: f64,
    #[serde(default)]
    pub delay_organisation_hours: f64,
    #[serde(default)]
    pub technicians: u32,
    #[serde(default)]
    pub specialists: u32,
    #[serde(default)]
    pub access_limits: MetOceanLimits,
    #[serde(default)]
    pub work_limits: MetOceanLimits,
    #[serde(default)]
    pub requires_lifting: bool,
    #[serde(default)]
    pub requires_divers: bool,
    #[serde(default)]
    pub requires_towing: bool,
}

pub type RepairActionRecord = ActionRecord;
pub type InspectionRecord = ActionRecord;

/// A generating device with its position and expected yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub zone: String,
    pub depth_m: f64,
    #[serde(default)]
    pub soil_type: String,
    /// Annual energy production from the upstream energy model (MWh)
    pub annual_energy_mwh: f64,
}
