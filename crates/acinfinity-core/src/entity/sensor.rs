// Read-only numeric and timestamp readings.

use chrono::TimeDelta;
use chrono_tz::Tz;

use acinfinity_api::keys::{port, sensor};

use super::{Description, EntityContext, EntityKind, EntityValue, Source, round_to};
use crate::model::SensorType;

const TEMPERATURE: &str = "temperature";
const HUMIDITY: &str = "humidity";
const PRESSURE: &str = "pressure";

const fn controller(key: &'static str, label: &'static str) -> Description {
    Description::new(
        EntityKind::Sensor,
        Source::ControllerProperty,
        key,
        label,
        hundredths,
    )
}

const fn ai(key: &'static str, label: &'static str, types: &'static [SensorType]) -> Description {
    Description::new(EntityKind::Sensor, Source::SensorProperty, key, label, ai_reading)
        .sensor_types(types)
        .suitable(ai_reading_exists)
}

const fn port_reading(key: &'static str, label: &'static str) -> Description {
    Description::new(EntityKind::Sensor, Source::PortProperty, key, label, integer)
}

pub(super) static DESCRIPTIONS: &[Description] = &[
    // controller readings, reported in hundredths
    controller("temperature", "Temperature")
        .device_class(TEMPERATURE)
        .unit("°C"),
    controller("humidity", "Humidity")
        .device_class(HUMIDITY)
        .unit("%"),
    controller("vpdnums", "VPD").device_class(PRESSURE).unit("kPa"),
    // AI controller sensor ports
    ai(
        "probeTemperature",
        "Probe Temperature",
        &[SensorType::ProbeTemperatureF, SensorType::ProbeTemperatureC],
    )
    .device_class(TEMPERATURE)
    .unit("°C"),
    ai("probeHumidity", "Probe Humidity", &[SensorType::ProbeHumidity])
        .device_class(HUMIDITY)
        .unit("%"),
    ai("probeVaporPressureDeficit", "Probe VPD", &[SensorType::ProbeVpd])
        .device_class(PRESSURE)
        .unit("kPa"),
    ai(
        "controllerTemperature",
        "Temperature",
        &[
            SensorType::ControllerTemperatureF,
            SensorType::ControllerTemperatureC,
        ],
    )
    .device_class(TEMPERATURE)
    .unit("°C"),
    ai("controllerHumidity", "Humidity", &[SensorType::ControllerHumidity])
        .device_class(HUMIDITY)
        .unit("%"),
    ai("controllerVaporPressureDeficit", "VPD", &[SensorType::ControllerVpd])
        .device_class(PRESSURE)
        .unit("kPa"),
    ai("co2Sensor", "CO2", &[SensorType::Co2])
        .device_class("carbon_dioxide")
        .unit("ppm"),
    ai("lightSensor", "Light", &[SensorType::Light]).unit("%"),
    ai("soilSensor", "Soil Moisture", &[SensorType::Soil])
        .device_class("moisture")
        .unit("%"),
    // ports
    port_reading(port::SPEAK, "Power").device_class("power_factor"),
    port_reading(port::REMAINING_TIME, "Remaining Time")
        .device_class("duration")
        .unit("s"),
    Description::new(
        EntityKind::Sensor,
        Source::PortProperty,
        "nextStateChange",
        "Next State Change",
        next_state_change,
    )
    .device_class("timestamp")
    .suitable(remaining_time_exists),
];

// ── Value functions ──────────────────────────────────────────────────

fn hundredths(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Float(ctx.float(ctx.key()).unwrap_or(0.0) / 100.0)
}

fn integer(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Int(ctx.int_or_zero())
}

fn ai_reading_exists(ctx: &EntityContext<'_>) -> bool {
    ctx.exists(sensor::SENSOR_PRECISION) && ctx.exists(sensor::SENSOR_DATA)
}

/// `sensorData` scaled by `sensorPrecision`; Fahrenheit sensors are
/// reported in Celsius.
fn ai_reading(ctx: &EntityContext<'_>) -> EntityValue {
    let data = ctx.float(sensor::SENSOR_DATA).unwrap_or(0.0);
    let precision = ctx.int(sensor::SENSOR_PRECISION).unwrap_or(1);

    let mut value = if precision > 1 {
        let exponent = i32::try_from(precision - 1).unwrap_or(i32::MAX);
        data / 10f64.powi(exponent)
    } else {
        data
    };

    if ctx.sensor().is_some_and(|s| s.sensor_type.is_fahrenheit()) {
        value = round_to((value - 32.0) * 5.0 / 9.0, 2);
    }
    EntityValue::Float(value)
}

fn remaining_time_exists(ctx: &EntityContext<'_>) -> bool {
    ctx.exists(port::REMAINING_TIME)
}

/// Now, in the controller's zone, plus the seconds left on the port's
/// timer. `None` when no change is pending.
fn next_state_change(ctx: &EntityContext<'_>) -> EntityValue {
    let remaining = ctx.int(port::REMAINING_TIME).unwrap_or(0);
    if remaining <= 0 {
        return EntityValue::None;
    }
    let delta = TimeDelta::seconds(remaining);

    let zone = ctx
        .target
        .controller()
        .time_zone
        .as_deref()
        .and_then(|name| name.parse::<Tz>().ok());

    let at = match zone {
        Some(tz) => (ctx.now.with_timezone(&tz) + delta).fixed_offset(),
        None => (ctx.now + delta).fixed_offset(),
    };
    EntityValue::Timestamp(at)
}
