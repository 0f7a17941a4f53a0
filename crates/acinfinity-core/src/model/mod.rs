// ── Domain model ──
//
// Typed views of the controllers, ports and sensors found in a snapshot.

mod controller;
mod device;
mod kinds;

pub use controller::{Controller, ControllerRef, Port, Sensor};
pub use device::DeviceInfo;
pub use kinds::{ControllerType, PortMode, SensorType, TemperatureUnit};
