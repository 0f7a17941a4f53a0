// ── Controller, port and sensor views ──
//
// Typed, read-only projections of one snapshot. They carry just enough to
// name and group entities; every value an entity displays is read from
// the raw property maps instead.

use std::sync::Arc;

use serde::Serialize;

use super::device::DeviceInfo;
use super::kinds::{ControllerType, PortMode, SensorType, TemperatureUnit};
use crate::{DOMAIN, MANUFACTURER};

/// A UIS controller on the account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controller {
    pub id: String,
    pub name: String,
    pub mac: String,
    pub controller_type: ControllerType,
    pub hw_version: Option<String>,
    pub sw_version: Option<String>,
    pub online: bool,
    /// IANA zone name as configured in the app (`zoneId`).
    pub time_zone: Option<String>,
    pub temperature_unit: TemperatureUnit,
    pub ports: Vec<Port>,
    pub sensors: Vec<Sensor>,
}

impl Controller {
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifier: self.id.clone(),
            name: self.name.clone(),
            manufacturer: MANUFACTURER,
            model: self.controller_type.model(),
            hw_version: self.hw_version.clone(),
            sw_version: self.sw_version.clone(),
            via_device: None,
        }
    }

    pub fn port(&self, index: u32) -> Option<&Port> {
        self.ports.iter().find(|p| p.index == index)
    }

    /// Prefix shared by every unique id under this controller.
    pub(crate) fn unique_id_prefix(&self) -> String {
        format!("{DOMAIN}_{}", self.mac)
    }
}

/// A USB-C device port on a controller, with or without a device plugged in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub index: u32,
    pub name: String,
    pub online: bool,
    /// Mode from the port controls; `None` when controls were not fetched
    /// or carry an unknown `atType`.
    pub active_mode: Option<PortMode>,
    /// `loadType` from the port settings.
    pub load_type: Option<i64>,
}

impl Port {
    pub fn device_info(&self, controller: &Controller) -> DeviceInfo {
        DeviceInfo {
            identifier: format!("{}_{}", controller.id, self.index),
            name: format!("{} {}", controller.name, self.name),
            manufacturer: MANUFACTURER,
            model: "UIS Enabled Device".into(),
            hw_version: None,
            sw_version: None,
            via_device: Some(controller.id.clone()),
        }
    }
}

/// A sensor reported by an AI controller, built in or plugged into a
/// sensor port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    pub access_port: u32,
    pub sensor_type: SensorType,
}

impl Sensor {
    pub fn device_info(&self, controller: &Controller) -> DeviceInfo {
        let port = self.access_port;
        let (suffix, name, model) = match self.sensor_type {
            t if t.is_builtin() => return controller.device_info(),
            t if t.is_probe() => (
                "spc24".to_owned(),
                format!("{} Probe Sensor", controller.name),
                "UIS Controller Sensor Probe (AC-SPC24)".to_owned(),
            ),
            SensorType::Co2 | SensorType::Light => (
                "cos3".to_owned(),
                format!("{} CO2 + Light Sensor", controller.name),
                "UIS CO2 + Light Sensor (AC-COS3)".to_owned(),
            ),
            other => (
                format!("unknown{}", other.code()),
                format!("{} Unknown Sensor", controller.name),
                format!("UIS Sensor Type {}", other.code()),
            ),
        };

        DeviceInfo {
            identifier: format!("{}_{port}_{suffix}", controller.id),
            name,
            manufacturer: MANUFACTURER,
            model,
            hw_version: None,
            sw_version: None,
            via_device: Some(controller.id.clone()),
        }
    }
}

/// Controllers are shared between entities of one snapshot.
pub type ControllerRef = Arc<Controller>;
