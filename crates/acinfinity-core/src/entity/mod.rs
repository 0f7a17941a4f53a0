// ── Entity adapters ──
//
// Every entity is a static `Description` (plain data plus function
// pointers) bound to a target: a controller, an AI sensor or a port.
// Values are computed from a `Snapshot` on demand, and writes are pure
// functions from (snapshot, value) to a `Command`.

mod binary_sensor;
mod number;
mod select;
mod sensor;
mod switch;
mod time;
mod value;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use acinfinity_api::keys::control;
use acinfinity_api::models::{as_f64, as_i64};

use crate::command::{Command, KeyValues};
use crate::config::{EntityCategory, EntitySelection};
use crate::error::CoreError;
use crate::model::{ControllerRef, DeviceInfo, Port, PortMode, Sensor, SensorType, TemperatureUnit};
use crate::store::Snapshot;

pub use value::EntityValue;

// ── Kinds and sources ────────────────────────────────────────────────

/// Platform an entity belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Sensor,
    BinarySensor,
    Switch,
    Number,
    Select,
    Time,
}

impl EntityKind {
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Switch | Self::Number | Self::Select | Self::Time)
    }
}

/// Which part of a snapshot an entity reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    ControllerProperty,
    SensorProperty,
    PortProperty,
    PortControl,
    ControllerSetting,
    PortSetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Controller,
    Sensor,
    Port,
}

impl Source {
    pub fn category(self) -> EntityCategory {
        match self {
            Self::ControllerProperty | Self::SensorProperty | Self::PortProperty => {
                EntityCategory::Sensors
            }
            Self::PortControl => EntityCategory::Controls,
            Self::ControllerSetting | Self::PortSetting => EntityCategory::Settings,
        }
    }

    fn scope(self) -> Scope {
        match self {
            Self::ControllerProperty | Self::ControllerSetting => Scope::Controller,
            Self::SensorProperty => Scope::Sensor,
            Self::PortProperty | Self::PortControl | Self::PortSetting => Scope::Port,
        }
    }
}

/// Bounds of a number entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

// ── Descriptions ─────────────────────────────────────────────────────

type SuitableFn = fn(&EntityContext<'_>) -> bool;
type GetFn = fn(&EntityContext<'_>) -> EntityValue;
type SetFn = fn(&EntityContext<'_>, &EntityValue) -> Result<KeyValues, CoreError>;

/// Static description of one entity type.
#[derive(Clone, Copy)]
pub struct Description {
    /// Wire key, or a reference key for AI sensors.
    pub key: &'static str,
    pub kind: EntityKind,
    pub source: Source,
    pub label: &'static str,
    pub device_class: Option<&'static str>,
    pub unit: Option<&'static str>,
    /// AI sensor types this description applies to.
    pub sensor_types: &'static [SensorType],
    /// Port modes in which this control takes effect; empty for all.
    pub modes: &'static [PortMode],
    pub options: Option<&'static [&'static str]>,
    pub range: Option<NumberRange>,
    /// Tighter bound applied when the controller displays Celsius.
    pub celsius_limit: Option<f64>,
    suitable: SuitableFn,
    get: GetFn,
    set: Option<SetFn>,
}

impl fmt::Debug for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Description")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Description {
    const fn new(
        kind: EntityKind,
        source: Source,
        key: &'static str,
        label: &'static str,
        get: GetFn,
    ) -> Self {
        Self {
            key,
            kind,
            source,
            label,
            device_class: None,
            unit: None,
            sensor_types: &[],
            modes: &[],
            options: None,
            range: None,
            celsius_limit: None,
            suitable: key_exists,
            get,
            set: None,
        }
    }

    const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    const fn device_class(mut self, device_class: &'static str) -> Self {
        self.device_class = Some(device_class);
        self
    }

    const fn sensor_types(mut self, types: &'static [SensorType]) -> Self {
        self.sensor_types = types;
        self
    }

    const fn modes(mut self, modes: &'static [PortMode]) -> Self {
        self.modes = modes;
        self
    }

    const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = Some(options);
        self
    }

    const fn range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.range = Some(NumberRange { min, max, step });
        self
    }

    const fn celsius_limit(mut self, limit: f64) -> Self {
        self.celsius_limit = Some(limit);
        self
    }

    const fn suitable(mut self, suitable: SuitableFn) -> Self {
        self.suitable = suitable;
        self
    }

    const fn get(mut self, get: GetFn) -> Self {
        self.get = get;
        self
    }

    const fn set(mut self, set: SetFn) -> Self {
        self.set = Some(set);
        self
    }
}

/// Every known description, in platform order.
pub fn descriptions() -> impl Iterator<Item = &'static Description> {
    sensor::DESCRIPTIONS
        .iter()
        .chain(binary_sensor::DESCRIPTIONS)
        .chain(switch::DESCRIPTIONS)
        .chain(number::DESCRIPTIONS)
        .chain(select::DESCRIPTIONS)
        .chain(time::DESCRIPTIONS)
}

fn key_exists(ctx: &EntityContext<'_>) -> bool {
    ctx.exists(ctx.description.key)
}

// ── Targets ──────────────────────────────────────────────────────────

/// What an entity is attached to.
#[derive(Debug, Clone)]
pub enum Target {
    Controller(ControllerRef),
    Sensor(ControllerRef, Sensor),
    Port(ControllerRef, Port),
}

impl Target {
    pub fn controller(&self) -> &ControllerRef {
        match self {
            Self::Controller(c) | Self::Sensor(c, _) | Self::Port(c, _) => c,
        }
    }

    pub fn port_index(&self) -> Option<u32> {
        match self {
            Self::Port(_, port) => Some(port.index),
            _ => None,
        }
    }

    pub fn device_info(&self) -> DeviceInfo {
        match self {
            Self::Controller(c) => c.device_info(),
            Self::Sensor(c, sensor) => sensor.device_info(c),
            Self::Port(c, port) => port.device_info(c),
        }
    }

    fn unique_id(&self, key: &str) -> String {
        match self {
            Self::Controller(c) => format!("{}_{key}", c.unique_id_prefix()),
            Self::Sensor(c, sensor) => {
                format!("{}_sensor_{}_{key}", c.unique_id_prefix(), sensor.access_port)
            }
            Self::Port(c, port) => format!("{}_port_{}_{key}", c.unique_id_prefix(), port.index),
        }
    }
}

// ── Evaluation context ───────────────────────────────────────────────

/// Everything a description function may look at.
pub(crate) struct EntityContext<'a> {
    pub snapshot: &'a Snapshot,
    pub target: &'a Target,
    pub description: &'static Description,
    pub now: DateTime<Utc>,
}

impl EntityContext<'_> {
    pub fn device_id(&self) -> &str {
        &self.target.controller().id
    }

    /// Port index, 0 for controller-level targets.
    pub fn port(&self) -> u32 {
        self.target.port_index().unwrap_or(0)
    }

    pub fn key(&self) -> &'static str {
        self.description.key
    }

    /// Read `key` from the description's source.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let (id, port) = (self.device_id(), self.port());
        match self.description.source {
            Source::ControllerProperty => self.snapshot.controller_property(id, key),
            Source::SensorProperty => match self.target {
                Target::Sensor(_, sensor) => self.snapshot.sensor_property(
                    id,
                    sensor.access_port,
                    sensor.sensor_type.code(),
                    key,
                ),
                _ => None,
            },
            Source::PortProperty => self.snapshot.port_property(id, port, key),
            Source::PortControl => self.snapshot.port_control(id, port, key),
            Source::ControllerSetting => self.snapshot.controller_setting(id, key),
            Source::PortSetting => self.snapshot.port_setting(id, port, key),
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        let (id, port) = (self.device_id(), self.port());
        match self.description.source {
            Source::ControllerProperty => self.snapshot.controller_property_exists(id, key),
            Source::SensorProperty => match self.target {
                Target::Sensor(_, sensor) => self.snapshot.sensor_property_exists(
                    id,
                    sensor.access_port,
                    sensor.sensor_type.code(),
                    key,
                ),
                _ => false,
            },
            Source::PortProperty => self.snapshot.port_property_exists(id, port, key),
            Source::PortControl => self.snapshot.port_control_exists(id, port, key),
            Source::ControllerSetting => self.snapshot.controller_setting_exists(id, key),
            Source::PortSetting => self.snapshot.port_setting_exists(id, port, key),
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.lookup(key).and_then(as_i64)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.lookup(key).and_then(as_f64)
    }

    /// The description's own key as an integer, 0 when null or absent.
    pub fn int_or_zero(&self) -> i64 {
        self.int(self.key()).unwrap_or(0)
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.snapshot.temperature_unit(self.device_id())
    }

    pub fn is_celsius(&self) -> bool {
        self.temperature_unit() == TemperatureUnit::Celsius
    }

    pub fn sensor(&self) -> Option<&Sensor> {
        match self.target {
            Target::Sensor(_, sensor) => Some(sensor),
            _ => None,
        }
    }

    /// Wrap key/values in the write matching the description's source.
    fn command(&self, values: KeyValues) -> Result<Command, CoreError> {
        let controller_id = self.device_id().to_owned();
        match self.description.source {
            Source::PortControl => Ok(Command::UpdatePortControls {
                controller_id,
                port: self.port(),
                values,
            }),
            Source::PortSetting => Ok(Command::UpdatePortSettings {
                controller_id,
                port: self.port(),
                values,
            }),
            Source::ControllerSetting => Ok(Command::UpdateControllerSettings {
                controller_id,
                values,
            }),
            Source::ControllerProperty | Source::SensorProperty | Source::PortProperty => {
                Err(self.read_only())
            }
        }
    }

    fn read_only(&self) -> CoreError {
        CoreError::ReadOnly {
            unique_id: self.target.unique_id(self.key()),
        }
    }

    pub fn invalid(&self, reason: impl Into<String>) -> CoreError {
        CoreError::InvalidValue {
            unique_id: self.target.unique_id(self.key()),
            reason: reason.into(),
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────

/// A description bound to a target.
#[derive(Debug, Clone)]
pub struct Entity {
    pub unique_id: String,
    /// `{kind}.{unique_id}`. Unique ids repeat across platforms (a
    /// schedule has both a switch and a time entity), entity ids do not.
    pub entity_id: String,
    pub description: &'static Description,
    pub target: Target,
}

impl Entity {
    pub fn new(description: &'static Description, target: Target) -> Self {
        let unique_id = target.unique_id(description.key);
        let entity_id = format!("{}.{unique_id}", description.kind);
        Self {
            unique_id,
            entity_id,
            description,
            target,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.description.kind
    }

    pub fn category(&self) -> EntityCategory {
        self.description.source.category()
    }

    fn context<'a>(&'a self, snapshot: &'a Snapshot, now: DateTime<Utc>) -> EntityContext<'a> {
        EntityContext {
            snapshot,
            target: &self.target,
            description: self.description,
            now,
        }
    }

    pub fn is_suitable(&self, snapshot: &Snapshot) -> bool {
        (self.description.suitable)(&self.context(snapshot, Utc::now()))
    }

    pub fn value(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> EntityValue {
        (self.description.get)(&self.context(snapshot, now))
    }

    /// Whether the port's active mode uses this control.
    pub fn is_live(&self, snapshot: &Snapshot) -> bool {
        if self.description.modes.is_empty() {
            return true;
        }
        let Some(port) = self.target.port_index() else {
            return true;
        };
        snapshot
            .port_control(&self.target.controller().id, port, control::AT_TYPE)
            .and_then(as_i64)
            .and_then(PortMode::from_at_type)
            .is_some_and(|mode| self.description.modes.contains(&mode))
    }

    /// Effective bounds under the controller's current temperature unit.
    pub fn range(&self, snapshot: &Snapshot) -> Option<NumberRange> {
        let mut range = self.description.range?;
        if let Some(limit) = self.description.celsius_limit {
            if snapshot.temperature_unit(&self.target.controller().id) == TemperatureUnit::Celsius {
                range.min = range.min.max(-limit);
                range.max = range.max.min(limit);
            }
        }
        Some(range)
    }

    /// Parse `raw` against the latest snapshot.
    pub fn parse(&self, snapshot: &Snapshot, raw: &str) -> Result<EntityValue, CoreError> {
        self.parse_value(raw, self.range(snapshot))
    }

    /// Build the write that stores `value`.
    pub fn build_command(
        &self,
        snapshot: &Snapshot,
        value: &EntityValue,
    ) -> Result<Command, CoreError> {
        let ctx = self.context(snapshot, Utc::now());
        let set = self.description.set.ok_or_else(|| ctx.read_only())?;
        let values = set(&ctx, value)?;
        ctx.command(values)
    }

    pub fn state(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> EntityState {
        let device = self.target.device_info();
        EntityState {
            entity_id: self.entity_id.clone(),
            unique_id: self.unique_id.clone(),
            kind: self.kind(),
            key: self.description.key,
            name: format!("{} {}", device.name, self.description.label),
            category: self.category(),
            controller_id: self.target.controller().id.clone(),
            port: self.target.port_index(),
            device,
            value: self.value(snapshot, now),
            unit: self.description.unit,
            device_class: self.description.device_class,
            options: self.description.options,
            range: self.range(snapshot),
            writable: self.kind().is_writable(),
            live: self.is_live(snapshot),
            available: true,
        }
    }
}

/// Published state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub entity_id: String,
    pub unique_id: String,
    pub kind: EntityKind,
    pub key: &'static str,
    pub name: String,
    pub category: EntityCategory,
    pub controller_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    pub device: DeviceInfo,
    pub value: EntityValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<NumberRange>,
    pub writable: bool,
    /// False when the port's active mode ignores this control.
    pub live: bool,
    /// False while the last refresh failed.
    pub available: bool,
}

// ── Discovery ────────────────────────────────────────────────────────

/// Result of matching every description against a snapshot.
#[derive(Debug, Default)]
pub struct Discovery {
    pub entities: Vec<Entity>,
    /// Candidates whose data is missing from the snapshot.
    pub unsuitable: Vec<Entity>,
}

impl Discovery {
    /// Find an entity by entity id, or by unique id when that is unambiguous.
    pub fn find(&self, identifier: &str) -> Result<&Entity, CoreError> {
        if let Some(entity) = self.entities.iter().find(|e| e.entity_id == identifier) {
            return Ok(entity);
        }

        let matches: Vec<&Entity> = self
            .entities
            .iter()
            .filter(|e| e.unique_id == identifier)
            .collect();
        match matches.as_slice() {
            [] => Err(CoreError::EntityNotFound {
                unique_id: identifier.to_owned(),
            }),
            [entity] => Ok(entity),
            many => Err(CoreError::AmbiguousEntity {
                identifier: identifier.to_owned(),
                candidates: many.iter().map(|e| e.entity_id.clone()).collect(),
            }),
        }
    }
}

/// Enumerate controllers, sensors and ports and keep the suitable entities.
///
/// AI+ controllers get no writable entities. `selection` filters by
/// category per controller id.
pub fn discover(snapshot: &Snapshot, selection: impl Fn(&str) -> EntitySelection) -> Discovery {
    let mut discovery = Discovery::default();
    let mut seen = HashSet::new();

    for controller in snapshot.controllers() {
        let selection = selection(&controller.id);
        let eligible = |d: &&'static Description| {
            selection.includes(d.source.category())
                && !(controller.controller_type.is_ai() && d.kind.is_writable())
        };

        let mut candidates: Vec<Entity> = descriptions()
            .filter(|d| d.source.scope() == Scope::Controller)
            .filter(eligible)
            .map(|d| Entity::new(d, Target::Controller(controller.clone())))
            .collect();

        for sensor in &controller.sensors {
            candidates.extend(
                descriptions()
                    .filter(|d| d.source.scope() == Scope::Sensor)
                    .filter(|d| d.sensor_types.contains(&sensor.sensor_type))
                    .filter(eligible)
                    .map(|d| Entity::new(d, Target::Sensor(controller.clone(), sensor.clone()))),
            );
        }

        for port in &controller.ports {
            candidates.extend(
                descriptions()
                    .filter(|d| d.source.scope() == Scope::Port)
                    .filter(eligible)
                    .map(|d| Entity::new(d, Target::Port(controller.clone(), port.clone()))),
            );
        }

        for entity in candidates {
            if !seen.insert(entity.entity_id.clone()) {
                continue;
            }
            if entity.is_suitable(snapshot) {
                discovery.entities.push(entity);
            } else {
                discovery.unsuitable.push(entity);
            }
        }
    }

    discovery
}

/// Round to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Convert a user number to the integer the cloud stores.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn to_wire(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{AI_DEVICE_ID, DEVICE_ID, Fixture};

    fn all(_: &str) -> EntitySelection {
        EntitySelection::All
    }

    fn find<'a>(discovery: &'a Discovery, entity_id: &str) -> &'a Entity {
        discovery
            .entities
            .iter()
            .find(|e| e.entity_id == entity_id)
            .unwrap_or_else(|| panic!("{entity_id} not discovered"))
    }

    #[test]
    fn unique_ids_follow_target_shape() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, all);

        find(&discovery, "sensor.ac_infinity_2B120D62DC00_temperature");
        find(&discovery, "sensor.ac_infinity_2B120D62DC00_port_1_speak");
        find(
            &discovery,
            "sensor.ac_infinity_9C0F0FF1AB22_sensor_1_probeTemperature",
        );
    }

    #[test]
    fn ai_controllers_get_no_writable_entities() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, all);

        assert!(
            discovery
                .entities
                .iter()
                .filter(|e| e.target.controller().id == AI_DEVICE_ID)
                .all(|e| !e.kind().is_writable())
        );
        assert!(
            discovery
                .entities
                .iter()
                .any(|e| e.target.controller().id == DEVICE_ID && e.kind() == EntityKind::Number)
        );
    }

    #[test]
    fn selection_filters_categories() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, |id| {
            if id == DEVICE_ID {
                EntitySelection::SensorsOnly
            } else {
                EntitySelection::Disable
            }
        });

        assert!(!discovery.entities.is_empty());
        assert!(
            discovery
                .entities
                .iter()
                .all(|e| e.category() == EntityCategory::Sensors && e.target.controller().id == DEVICE_ID)
        );
    }

    #[test]
    fn missing_keys_are_unsuitable() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, all);

        // The fixture's port 3 has no loadState.
        assert!(
            discovery
                .unsuitable
                .iter()
                .any(|e| e.entity_id == "binary_sensor.ac_infinity_2B120D62DC00_port_3_loadState")
        );
    }

    #[test]
    fn find_prefers_entity_id_and_rejects_ambiguity() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, all);

        let uid = "ac_infinity_2B120D62DC00_port_1_schedStartTime";
        assert!(matches!(
            discovery.find(uid),
            Err(CoreError::AmbiguousEntity { .. })
        ));
        assert_eq!(
            discovery.find(&format!("time.{uid}")).unwrap().kind(),
            EntityKind::Time
        );
        assert_eq!(
            discovery
                .find("ac_infinity_2B120D62DC00_humidity")
                .unwrap()
                .kind(),
            EntityKind::Sensor
        );
        assert!(matches!(
            discovery.find("nope"),
            Err(CoreError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn live_follows_active_mode() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, all);

        // Port 1 runs in Auto.
        let auto = find(&discovery, "number.ac_infinity_2B120D62DC00_port_1_devHt");
        let vpd = find(&discovery, "number.ac_infinity_2B120D62DC00_port_1_targetVpd");
        let speed = find(&discovery, "number.ac_infinity_2B120D62DC00_port_1_onSpead");
        assert!(auto.is_live(&snapshot));
        assert!(!vpd.is_live(&snapshot));
        assert!(speed.is_live(&snapshot));
    }

    #[test]
    fn state_names_entities_after_their_device() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, all);
        let entity = find(&discovery, "sensor.ac_infinity_2B120D62DC00_port_1_speak");

        let state = entity.state(&snapshot, Utc::now());
        assert_eq!(state.name, "Grow Tent Grow Lights Power");
        assert_eq!(state.port, Some(1));
        assert_eq!(state.category, EntityCategory::Sensors);
        assert!(state.available);
    }

    #[test]
    fn sensors_are_read_only() {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, all);
        let entity = find(&discovery, "sensor.ac_infinity_2B120D62DC00_humidity");

        assert!(matches!(
            entity.parse(&snapshot, "5"),
            Err(CoreError::ReadOnly { .. })
        ));
        assert!(matches!(
            entity.build_command(&snapshot, &EntityValue::Int(5)),
            Err(CoreError::ReadOnly { .. })
        ));
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round_to(23.456, 2), 23.46);
        assert_eq!(to_wire(2.5), 3);
        assert_eq!(to_wire(-0.4), 0);
    }
}
