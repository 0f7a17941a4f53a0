// acinfinity-core: Polling coordinator and entity layer between
// acinfinity-api and consumers (CLI).

pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;
pub mod setup;
pub mod store;

#[cfg(test)]
mod testing;

/// Prefix of every unique id and device identifier.
pub const DOMAIN: &str = "ac_infinity";
pub const MANUFACTURER: &str = "AC Infinity";

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::{CoordinatorConfig, EntityCategory, EntitySelection, RetryPolicy};
pub use coordinator::{ConnectionState, Coordinator, RefreshStatus};
pub use entity::{Entity, EntityKind, EntityState, EntityValue};
pub use error::CoreError;
pub use model::{Controller, ControllerRef, ControllerType, DeviceInfo, Port, PortMode, Sensor, SensorType, TemperatureUnit};
pub use setup::{EntryIdentity, FlowError};
pub use store::{DataStore, EntityStream, Snapshot};
