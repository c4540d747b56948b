//! Domain models for the O&M simulator

pub mod component;
pub mod event;
pub mod reliability;
pub mod state;
pub mod strategy;
pub mod tables;

// Re-exports
pub use component::{
    ActionRecord, CalendarWindow, ComponentId, ComponentKind, ComponentRecord, ConditionWindow,
    DeviceId, DeviceRecord, FailureModeRecord, InspectionRecord, MetOceanLimits, Owner,
    RepairActionRecord, SpareSpec,
};
pub use event::{Event, EventLog};
pub use reliability::{
    Breakdown, DeviceNode, NetworkNode, RamRow, RamTable, ReliabilityOutput, SubhubNode, Subsystem,
    SubsystemNode,
};
pub use state::{ArrayState, ComponentAccumulator, CostEntry, DeviceAccumulator, DowntimeEntry};
pub use strategy::{PerStrategy, Strategy};
pub use tables::{
    CalendarEvent, ComponentRef, ConditionEvent, CorrectiveEvent, MaintenanceRecord, OutputTables,
};
