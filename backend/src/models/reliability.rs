//! Reliability-network output and the flattened RAM table
//!
//! The reliability network hands over a hierarchy of device, subhub and
//! subsystem nodes with failure rates in 1/hour. The core only needs a flat
//! view of `(owner, subsystem, rate in 1/year, breakdown)`, which is what
//! [`RamTable`] provides.

use crate::core::time::HOURS_PER_YEAR;
use crate::models::component::DeviceId;
use serde::{Deserialize, Serialize};

/// Devices knocked out when a subsystem fails.
///
/// Serialized as `"All"`, a single device id, or a list of device ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBreakdown", into = "RawBreakdown")]
pub enum Breakdown {
    All,
    Device(DeviceId),
    Devices(Vec<DeviceId>),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawBreakdown {
    One(String),
    Many(Vec<String>),
}

impl From<RawBreakdown> for Breakdown {
    fn from(raw: RawBreakdown) -> Self {
        match raw {
            RawBreakdown::One(s) if s.eq_ignore_ascii_case("all") => Breakdown::All,
            RawBreakdown::One(s) => Breakdown::Device(s),
            RawBreakdown::Many(list) => Breakdown::Devices(list),
        }
    }
}

impl From<Breakdown> for RawBreakdown {
    fn from(b: Breakdown) -> Self {
        match b {
            Breakdown::All => RawBreakdown::One("All".to_string()),
            Breakdown::Device(d) => RawBreakdown::One(d),
            Breakdown::Devices(list) => RawBreakdown::Many(list),
        }
    }
}

impl Breakdown {
    /// Concrete affected devices, in `all_devices` order for `All`.
    pub fn resolve(&self, all_devices: &[DeviceId]) -> Vec<DeviceId> {
        match self {
            Breakdown::All => all_devices.to_vec(),
            Breakdown::Device(d) => vec![d.clone()],
            Breakdown::Devices(list) => list.clone(),
        }
    }
}

/// Subsystem names the network emits, resolved once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    ArrayElectrical,
    DynamicCable,
    MooringFoundation,
    Hydrodynamic,
    Pto,
    Control,
    SupportStructure,
    ExportCable,
    Substation,
    SubhubElectrical,
    SubhubMooringFoundation,
    Other,
}

impl Subsystem {
    pub fn parse(name: &str) -> Subsystem {
        match name.trim().to_ascii_lowercase().as_str() {
            "array elec sub-system" => Subsystem::ArrayElectrical,
            "m&f sub-system dynamic cable" => Subsystem::DynamicCable,
            "m&f sub-system" => Subsystem::MooringFoundation,
            "hydrodynamic" => Subsystem::Hydrodynamic,
            "pto" => Subsystem::Pto,
            "control" => Subsystem::Control,
            "support structure" => Subsystem::SupportStructure,
            "export cable" => Subsystem::ExportCable,
            "substation" => Subsystem::Substation,
            "subhub elec sub-system" => Subsystem::SubhubElectrical,
            "subhub m&f sub-system" => Subsystem::SubhubMooringFoundation,
            _ => Subsystem::Other,
        }
    }
}

/// Leaf of the reliability hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemNode {
    pub name: String,
    pub failure_rate_per_hour: f64,
    #[serde(default)]
    pub breakdown: Option<Breakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceNode {
    pub device_id: DeviceId,
    pub subsystems: Vec<SubsystemNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubhubNode {
    pub subhub_id: String,
    pub subsystems: Vec<SubsystemNode>,
    #[serde(default)]
    pub children: Vec<NetworkNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NetworkNode {
    Device(DeviceNode),
    Subhub(SubhubNode),
}

/// Reliability-network output for one replicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityOutput {
    /// Array-level subsystems (export cable, substation, array electrics)
    #[serde(default)]
    pub array: Vec<SubsystemNode>,
    #[serde(default)]
    pub nodes: Vec<NetworkNode>,
}

/// One row of the RAM table; `failure_rate` is in 1/year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RamRow {
    pub owner: String,
    pub subsystem: Subsystem,
    pub name: String,
    pub failure_rate: f64,
    pub breakdown: Option<Breakdown>,
}

/// Outcome of the dynamic-cable double-counting correction for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCorrection {
    pub owner: String,
    pub before: f64,
    pub after: f64,
}

/// Flattened per-subsystem failure-rate table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RamTable {
    rows: Vec<RamRow>,
}

impl RamTable {
    /// Table from rows already expressed in 1/year; no correction applied.
    pub fn from_rows(rows: Vec<RamRow>) -> Self {
        Self { rows }
    }

    /// Flatten the network output, convert 1/hour to 1/year and correct
    /// the dynamic-cable double counting.
    pub fn from_network(output: &ReliabilityOutput) -> (Self, Vec<RateCorrection>) {
        let mut rows = Vec::new();
        for sub in &output.array {
            rows.push(row_from_node("Array", sub, None));
        }
        for node in &output.nodes {
            flatten_node(node, &mut rows);
        }
        let mut table = Self { rows };
        let corrections = table.correct_dynamic_cable_double_counting();
        (table, corrections)
    }

    /// The network counts dynamic cables both under the M&F sub-system and
    /// inside the array electrical sub-system; remove them from the latter.
    ///
    /// An electrical row subtracts the dynamic-cable rows of its own owner;
    /// the array-owned electrical row falls back to all dynamic-cable rows
    /// when none is owned by the array itself. Rates never drop below zero.
    pub fn correct_dynamic_cable_double_counting(&mut self) -> Vec<RateCorrection> {
        let cable_rate = |rows: &[RamRow], owner: Option<&str>| -> (f64, usize) {
            rows.iter()
                .filter(|r| r.subsystem == Subsystem::DynamicCable)
                .filter(|r| owner.map_or(true, |o| r.owner == o))
                .fold((0.0, 0), |(sum, n), r| (sum + r.failure_rate, n + 1))
        };

        let mut updates = Vec::new();
        for (idx, row) in self.rows.iter().enumerate() {
            if row.subsystem != Subsystem::ArrayElectrical {
                continue;
            }
            let (own, own_count) = cable_rate(&self.rows, Some(&row.owner));
            let subtract = if own_count == 0 && row.owner == "Array" {
                cable_rate(&self.rows, None).0
            } else {
                own
            };
            if subtract > 0.0 {
                updates.push((idx, (row.failure_rate - subtract).max(0.0)));
            }
        }

        updates
            .into_iter()
            .map(|(idx, after)| {
                let row = &mut self.rows[idx];
                let correction = RateCorrection {
                    owner: row.owner.clone(),
                    before: row.failure_rate,
                    after,
                };
                row.failure_rate = after;
                correction
            })
            .collect()
    }

    pub fn rows(&self) -> &[RamRow] {
        &self.rows
    }

    /// First row for `(owner, subsystem)`.
    pub fn row(&self, owner: &str, subsystem: Subsystem) -> Option<&RamRow> {
        self.rows
            .iter()
            .find(|r| r.owner == owner && r.subsystem == subsystem)
    }

    pub fn rate(&self, owner: &str, subsystem: Subsystem) -> Option<f64> {
        self.row(owner, subsystem).map(|r| r.failure_rate)
    }
}

fn row_from_node(owner: &str, node: &SubsystemNode, default_breakdown: Option<Breakdown>) -> RamRow {
    RamRow {
        owner: owner.to_string(),
        subsystem: Subsystem::parse(&node.name),
        name: node.name.clone(),
        failure_rate: node.failure_rate_per_hour * HOURS_PER_YEAR,
        breakdown: node.breakdown.clone().or(default_breakdown),
    }
}

fn flatten_node(node: &NetworkNode, rows: &mut Vec<RamRow>) {
    match node {
        NetworkNode::Device(device) => {
            for sub in &device.subsystems {
                let own = Some(Breakdown::Device(device.device_id.clone()));
                rows.push(row_from_node(&device.device_id, sub, own));
            }
        }
        NetworkNode::Subhub(hub) => {
            for sub in &hub.subsystems {
                rows.push(row_from_node(&hub.subhub_id, sub, None));
            }
            for child in &hub.children {
                flatten_node(child, rows);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(owner: &str, name: &str, rate: f64) -> RamRow {
        RamRow {
            owner: owner.to_string(),
            subsystem: Subsystem::parse(name),
            name: name.to_string(),
            failure_rate: rate,
            breakdown: None,
        }
    }

    #[test]
    fn test_double_counting_correction_same_owner() {
        let mut table = RamTable::from_rows(vec![
            row("device001", "M&F sub-system dynamic cable", 0.1),
            row("device001", "Array elec sub-system", 0.5),
        ]);
        let corrections = table.correct_dynamic_cable_double_counting();
        assert_eq!(corrections.len(), 1);
        let rate = table.rate("device001", Subsystem::ArrayElectrical).unwrap();
        assert!((rate - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_double_counting_correction_array_owner_uses_all_cables() {
        let mut table = RamTable::from_rows(vec![
            row("device001", "M&F sub-system dynamic cable", 0.1),
            row("device002", "M&F sub-system dynamic cable", 0.05),
            row("Array", "Array elec sub-system", 0.5),
        ]);
        table.correct_dynamic_cable_double_counting();
        let rate = table.rate("Array", Subsystem::ArrayElectrical).unwrap();
        assert!((rate - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_correction_never_negative() {
        let mut table = RamTable::from_rows(vec![
            row("Array", "M&F sub-system dynamic cable", 0.9),
            row("Array", "Array elec sub-system", 0.5),
        ]);
        table.correct_dynamic_cable_double_counting();
        assert_eq!(table.rate("Array", Subsystem::ArrayElectrical), Some(0.0));
    }

    #[test]
    fn test_flatten_converts_hourly_rates() {
        let output = ReliabilityOutput {
            array: vec![SubsystemNode {
                name: "Export cable".to_string(),
                failure_rate_per_hour: 1.0 / HOURS_PER_YEAR,
                breakdown: None,
            }],
            nodes: vec![NetworkNode::Subhub(SubhubNode {
                subhub_id: "subhub001".to_string(),
                subsystems: vec![SubsystemNode {
                    name: "Subhub elec sub-system".to_string(),
                    failure_rate_per_hour: 2.0 / HOURS_PER_YEAR,
                    breakdown: Some(Breakdown::Devices(vec!["device001".to_string()])),
                }],
                children: vec![NetworkNode::Device(DeviceNode {
                    device_id: "device001".to_string(),
                    subsystems: vec![SubsystemNode {
                        name: "Pto".to_string(),
                        failure_rate_per_hour: 0.5 / HOURS_PER_YEAR,
                        breakdown: None,
                    }],
                })],
            })],
        };

        let (table, corrections) = RamTable::from_network(&output);
        assert!(corrections.is_empty());
        assert_eq!(table.rows().len(), 3);
        assert!((table.rate("Array", Subsystem::ExportCable).unwrap() - 1.0).abs() < 1e-9);
        assert!((table.rate("device001", Subsystem::Pto).unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(
            table.row("device001", Subsystem::Pto).unwrap().breakdown,
            Some(Breakdown::Device("device001".to_string()))
        );
        assert_eq!(table.device_owners(), vec!["device001".to_string()]);
    }

    #[test]
    fn test_breakdown_serde_forms() {
        let all: Breakdown = serde_json::from_str("\"All\"").unwrap();
        assert_eq!(all, Breakdown::All);
        let one: Breakdown = serde_json::from_str("\"device002\"").unwrap();
        assert_eq!(one, Breakdown::Device("device002".to_string()));
        let many: Breakdown = serde_json::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(many.resolve(&[]), vec!["a".to_string(), "b".to_string()]);
    }
}
