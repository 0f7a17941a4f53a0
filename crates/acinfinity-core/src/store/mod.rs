// ── Reactive data store ──
//
// Lock-free entity storage with push-based change notification.

mod collection;
mod data_store;
mod refresh;
mod snapshot;
mod subscription;

pub use data_store::DataStore;
pub use subscription::EntityStream;
pub use snapshot::{ControllerEntry, PortKey, SensorKey, Snapshot, SnapshotBuilder, as_text, is_truthy};

pub(crate) use refresh::fetch_snapshot;
