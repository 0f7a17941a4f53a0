// ── Immutable property snapshot ──
//
// One complete poll of the account: raw JSON keyed the way entities look
// values up, plus typed controller views derived from it. A snapshot is
// built off to the side by `SnapshotBuilder` and published whole.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use acinfinity_api::JsonObject;
use acinfinity_api::keys::{controller, port, sensor, setting};
use acinfinity_api::models::{as_i64, id_string};

use crate::model::{Controller, ControllerRef, Port, PortMode, Sensor, SensorType, TemperatureUnit};

/// `(device id, port)`. Port 0 addresses controller-level settings.
pub type PortKey = (String, u32);
/// `(device id, access port, sensor type)`.
pub type SensorKey = (String, u32, i64);

/// A point-in-time copy of everything the cloud reported.
///
/// Lookups return `None` both when the key is absent and when it holds
/// JSON `null`; the `*_exists` forms only check presence and back entity
/// suitability.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    controllers: BTreeMap<String, JsonObject>,
    sensors: BTreeMap<SensorKey, JsonObject>,
    ports: BTreeMap<PortKey, JsonObject>,
    port_controls: BTreeMap<PortKey, JsonObject>,
    settings: BTreeMap<PortKey, JsonObject>,
    views: Vec<ControllerRef>,
    fetched_at: Option<DateTime<Utc>>,
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn nested<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    obj.get(key).and_then(Value::as_object)
}

/// Python-style truthiness of a loosely typed field.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a scalar field as text.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    as_i64(value).and_then(|v| u32::try_from(v).ok())
}

impl Snapshot {
    /// When the data was fetched. `None` for an empty default snapshot.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    // ── Typed views ──────────────────────────────────────────────────

    /// Controllers in device-id order.
    pub fn controllers(&self) -> &[ControllerRef] {
        &self.views
    }

    pub fn controller(&self, device_id: &str) -> Option<&ControllerRef> {
        self.views.iter().find(|c| c.id == device_id)
    }

    /// The raw `devInfoListAll` entry of a controller.
    pub fn raw_controller(&self, device_id: &str) -> Option<&JsonObject> {
        self.controllers.get(device_id)
    }

    // ── Controller properties ────────────────────────────────────────

    /// Top-level field first, then the nested `deviceInfo` object.
    pub fn controller_property(&self, device_id: &str, key: &str) -> Option<&Value> {
        let obj = self.controllers.get(device_id)?;
        if let Some(value) = obj.get(key) {
            return non_null(Some(value));
        }
        non_null(nested(obj, controller::DEVICE_INFO)?.get(key))
    }

    pub fn controller_property_exists(&self, device_id: &str, key: &str) -> bool {
        self.controllers.get(device_id).is_some_and(|obj| {
            obj.contains_key(key)
                || nested(obj, controller::DEVICE_INFO).is_some_and(|info| info.contains_key(key))
        })
    }

    // ── Sensor properties ────────────────────────────────────────────

    pub fn sensor_property(
        &self,
        device_id: &str,
        access_port: u32,
        sensor_type: i64,
        key: &str,
    ) -> Option<&Value> {
        let obj = self
            .sensors
            .get(&(device_id.to_owned(), access_port, sensor_type))?;
        non_null(obj.get(key))
    }

    pub fn sensor_property_exists(
        &self,
        device_id: &str,
        access_port: u32,
        sensor_type: i64,
        key: &str,
    ) -> bool {
        self.sensors
            .get(&(device_id.to_owned(), access_port, sensor_type))
            .is_some_and(|obj| obj.contains_key(key))
    }

    // ── Port properties ──────────────────────────────────────────────

    pub fn port_property(&self, device_id: &str, port: u32, key: &str) -> Option<&Value> {
        let obj = self.ports.get(&(device_id.to_owned(), port))?;
        non_null(obj.get(key))
    }

    pub fn port_property_exists(&self, device_id: &str, port: u32, key: &str) -> bool {
        self.ports
            .get(&(device_id.to_owned(), port))
            .is_some_and(|obj| obj.contains_key(key))
    }

    // ── Port controls ────────────────────────────────────────────────

    /// Top-level field first, then the nested `devSetting` object.
    pub fn port_control(&self, device_id: &str, port: u32, key: &str) -> Option<&Value> {
        let obj = self.port_controls.get(&(device_id.to_owned(), port))?;
        if let Some(value) = obj.get(key) {
            return non_null(Some(value));
        }
        non_null(nested(obj, acinfinity_api::keys::control::DEV_SETTING)?.get(key))
    }

    pub fn port_control_exists(&self, device_id: &str, port: u32, key: &str) -> bool {
        self.port_controls
            .get(&(device_id.to_owned(), port))
            .is_some_and(|obj| {
                obj.contains_key(key)
                    || nested(obj, acinfinity_api::keys::control::DEV_SETTING)
                        .is_some_and(|s| s.contains_key(key))
            })
    }

    // ── Advanced settings ────────────────────────────────────────────

    pub fn port_setting(&self, device_id: &str, port: u32, key: &str) -> Option<&Value> {
        let obj = self.settings.get(&(device_id.to_owned(), port))?;
        non_null(obj.get(key))
    }

    pub fn port_setting_exists(&self, device_id: &str, port: u32, key: &str) -> bool {
        self.settings
            .get(&(device_id.to_owned(), port))
            .is_some_and(|obj| obj.contains_key(key))
    }

    pub fn controller_setting(&self, device_id: &str, key: &str) -> Option<&Value> {
        self.port_setting(device_id, 0, key)
    }

    pub fn controller_setting_exists(&self, device_id: &str, key: &str) -> bool {
        self.port_setting_exists(device_id, 0, key)
    }

    /// Display unit configured on the controller.
    pub fn temperature_unit(&self, device_id: &str) -> TemperatureUnit {
        TemperatureUnit::from_dev_company(
            self.controller_setting(device_id, setting::TEMP_UNIT)
                .and_then(as_i64)
                .unwrap_or(0),
        )
    }

    // ── View construction ────────────────────────────────────────────

    fn build_views(&self) -> Vec<ControllerRef> {
        self.controllers
            .keys()
            .map(|id| Arc::new(self.build_controller(id)))
            .collect()
    }

    fn build_controller(&self, id: &str) -> Controller {
        let text = |key: &str| self.controller_property(id, key).and_then(as_text);

        let ports = self
            .ports
            .keys()
            .filter(|(dev, _)| dev == id)
            .map(|(_, index)| self.build_port(id, *index))
            .collect();

        let sensors = self
            .sensors
            .keys()
            .filter(|(dev, _, _)| dev == id)
            .map(|(_, access_port, sensor_type)| Sensor {
                access_port: *access_port,
                sensor_type: SensorType::from(*sensor_type),
            })
            .collect();

        Controller {
            id: id.to_owned(),
            name: text(controller::DEVICE_NAME).unwrap_or_default(),
            mac: text(controller::MAC_ADDR).unwrap_or_default(),
            controller_type: self
                .controller_property(id, controller::DEVICE_TYPE)
                .and_then(as_i64)
                .unwrap_or_default()
                .into(),
            hw_version: text(controller::HW_VERSION),
            sw_version: text(controller::SW_VERSION),
            online: self
                .controller_property(id, controller::ONLINE)
                .is_some_and(is_truthy),
            time_zone: text(controller::TIME_ZONE),
            temperature_unit: self.temperature_unit(id),
            ports,
            sensors,
        }
    }

    fn build_port(&self, id: &str, index: u32) -> Port {
        Port {
            index,
            name: self
                .port_property(id, index, port::NAME)
                .and_then(as_text)
                .unwrap_or_default(),
            online: self
                .port_property(id, index, port::ONLINE)
                .is_some_and(is_truthy),
            active_mode: self
                .port_control(id, index, acinfinity_api::keys::control::AT_TYPE)
                .and_then(as_i64)
                .and_then(PortMode::from_at_type),
            load_type: self
                .port_setting(id, index, setting::DEVICE_LOAD_TYPE)
                .and_then(as_i64),
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// A controller accepted by [`SnapshotBuilder::add_controller`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerEntry {
    pub device_id: String,
    /// Indices from `deviceInfo.ports`, in wire order.
    pub ports: Vec<u32>,
}

/// Assembles a [`Snapshot`] from individual API responses.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a `devInfoListAll` entry with its sensors and ports.
    ///
    /// Returns `None` when the entry has no usable `devId`.
    pub fn add_controller(&mut self, properties: JsonObject) -> Option<ControllerEntry> {
        let device_id = properties.get(controller::DEVICE_ID).and_then(id_string)?;
        let mut ports = Vec::new();

        if let Some(info) = nested(&properties, controller::DEVICE_INFO) {
            if let Some(Value::Array(sensors)) = info.get(controller::SENSORS) {
                for entry in sensors.iter().filter_map(Value::as_object) {
                    let access_port = entry.get(sensor::ACCESS_PORT).and_then(as_u32);
                    let sensor_type = entry.get(sensor::SENSOR_TYPE).and_then(as_i64);
                    if let (Some(access_port), Some(sensor_type)) = (access_port, sensor_type) {
                        self.snapshot
                            .sensors
                            .insert((device_id.clone(), access_port, sensor_type), entry.clone());
                    }
                }
            }

            if let Some(Value::Array(entries)) = info.get(controller::PORTS) {
                for entry in entries.iter().filter_map(Value::as_object) {
                    if let Some(index) = entry.get(port::PORT).and_then(as_u32) {
                        self.snapshot
                            .ports
                            .insert((device_id.clone(), index), entry.clone());
                        ports.push(index);
                    }
                }
            }
        }

        self.snapshot
            .controllers
            .insert(device_id.clone(), properties);
        Some(ControllerEntry { device_id, ports })
    }

    pub fn add_port_controls(&mut self, device_id: &str, port: u32, controls: JsonObject) {
        self.snapshot
            .port_controls
            .insert((device_id.to_owned(), port), controls);
    }

    /// Store `getDevSetting` output; port 0 is the controller itself.
    pub fn add_settings(&mut self, device_id: &str, port: u32, settings: JsonObject) {
        self.snapshot
            .settings
            .insert((device_id.to_owned(), port), settings);
    }

    pub fn build(self) -> Snapshot {
        self.build_at(Utc::now())
    }

    pub fn build_at(mut self, fetched_at: DateTime<Utc>) -> Snapshot {
        self.snapshot.views = self.snapshot.build_views();
        self.snapshot.fetched_at = Some(fetched_at);
        self.snapshot
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::ControllerType;
    use crate::testing::{DEVICE_ID, Fixture};

    #[test]
    fn builder_indexes_ports_and_sensors() {
        let snapshot = Fixture::load().build();
        let ctrl = snapshot.controller(DEVICE_ID).unwrap();

        assert_eq!(ctrl.name, "Grow Tent");
        assert_eq!(ctrl.mac, "2B120D62DC00");
        assert_eq!(ctrl.controller_type, ControllerType::Uis69Pro);
        assert_eq!(ctrl.time_zone.as_deref(), Some("America/Chicago"));
        assert_eq!(
            ctrl.ports.iter().map(|p| p.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(ctrl.sensors.is_empty());
        assert_eq!(ctrl.ports[0].active_mode, Some(PortMode::Auto));
    }

    #[test]
    fn controller_property_falls_back_to_device_info() {
        let snapshot = Fixture::load().build();

        assert_eq!(
            snapshot.controller_property(DEVICE_ID, "temperature"),
            Some(&json!(2417))
        );
        assert!(snapshot.controller_property_exists(DEVICE_ID, "humidity"));
        assert!(!snapshot.controller_property_exists(DEVICE_ID, "nope"));
        assert!(!snapshot.controller_property_exists("unknown", "humidity"));
    }

    #[test]
    fn null_values_read_as_missing_but_exist() {
        let snapshot = Fixture::load().build();

        assert!(snapshot.port_property(DEVICE_ID, 2, "remainTime").is_none());
        assert!(snapshot.port_property_exists(DEVICE_ID, 2, "remainTime"));
    }

    #[test]
    fn port_control_falls_back_to_dev_setting() {
        let snapshot = Fixture::load().build();

        assert_eq!(snapshot.port_control(DEVICE_ID, 1, "onSpead"), Some(&json!(5)));
        assert!(snapshot.port_control_exists(DEVICE_ID, 1, "onTime"));
        assert_eq!(snapshot.port_control(DEVICE_ID, 1, "onTime"), Some(&json!(15)));
    }

    #[test]
    fn controller_setting_is_port_zero() {
        let snapshot = Fixture::load().build();

        assert_eq!(
            snapshot.controller_setting(DEVICE_ID, "devCh"),
            snapshot.port_setting(DEVICE_ID, 0, "devCh")
        );
        assert_eq!(snapshot.temperature_unit(DEVICE_ID), TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn ai_controller_sensors_are_keyed_by_port_and_type() {
        let snapshot = Fixture::load().build();
        let ai = snapshot.controller(crate::testing::AI_DEVICE_ID).unwrap();

        assert!(ai.controller_type.is_ai());
        assert!(
            ai.sensors
                .iter()
                .any(|s| s.access_port == 1 && s.sensor_type == SensorType::ProbeTemperatureF)
        );
        assert_eq!(
            snapshot.sensor_property(crate::testing::AI_DEVICE_ID, 1, 0, "sensorData"),
            Some(&json!(7450))
        );
    }

    #[test]
    fn entries_without_device_id_are_skipped() {
        let mut builder = SnapshotBuilder::new();
        let entry = builder.add_controller(
            json!({"devName": "orphan"}).as_object().cloned().unwrap(),
        );
        assert!(entry.is_none());
        assert!(builder.build().is_empty());
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(null)));
        assert!(is_truthy(&json!("x")));
        assert!(!is_truthy(&json!(false)));
    }
}
