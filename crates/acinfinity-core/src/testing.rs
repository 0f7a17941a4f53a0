// Shared fixtures for unit tests.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use serde_json::Value;

use acinfinity_api::JsonObject;

use crate::store::{Snapshot, SnapshotBuilder};

/// UIS 69 Pro with four ports.
pub(crate) const DEVICE_ID: &str = "1424979258063355749";
/// UIS 89 AI+ with plug-in sensors and no ports.
pub(crate) const AI_DEVICE_ID: &str = "1424979258063365849";

const DEVICES: &str = include_str!("../tests/fixtures/devices.json");
const PORT_CONTROLS: &str = include_str!("../tests/fixtures/port_controls.json");
const DEVICE_SETTINGS: &str = include_str!("../tests/fixtures/device_settings.json");

type ByPort = BTreeMap<(String, u32), JsonObject>;

/// Raw cloud responses, editable before building a snapshot.
#[derive(Debug, Clone)]
pub(crate) struct Fixture {
    pub devices: Vec<JsonObject>,
    pub controls: ByPort,
    pub settings: ByPort,
}

fn by_port(raw: &str) -> ByPort {
    let nested: BTreeMap<String, BTreeMap<u32, JsonObject>> =
        serde_json::from_str(raw).unwrap_or_else(|e| panic!("bad fixture: {e}"));
    nested
        .into_iter()
        .flat_map(|(device_id, ports)| {
            ports
                .into_iter()
                .map(move |(port, obj)| ((device_id.clone(), port), obj))
        })
        .collect()
}

impl Fixture {
    pub(crate) fn load() -> Self {
        Self {
            devices: serde_json::from_str(DEVICES).unwrap_or_else(|e| panic!("bad fixture: {e}")),
            controls: by_port(PORT_CONTROLS),
            settings: by_port(DEVICE_SETTINGS),
        }
    }

    pub(crate) fn set_control(&mut self, device_id: &str, port: u32, key: &str, value: Value) {
        self.controls
            .entry((device_id.to_owned(), port))
            .or_default()
            .insert(key.to_owned(), value);
    }

    pub(crate) fn set_setting(&mut self, device_id: &str, port: u32, key: &str, value: Value) {
        self.settings
            .entry((device_id.to_owned(), port))
            .or_default()
            .insert(key.to_owned(), value);
    }

    /// Build a snapshot stamped 2026-01-01T00:00:00Z.
    pub(crate) fn build(&self) -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        for device in &self.devices {
            builder.add_controller(device.clone());
        }
        for ((device_id, port), controls) in &self.controls {
            builder.add_port_controls(device_id, *port, controls.clone());
        }
        for ((device_id, port), settings) in &self.settings {
            builder.add_settings(device_id, *port, settings.clone());
        }
        let stamp = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        builder.build_at(stamp)
    }
}
