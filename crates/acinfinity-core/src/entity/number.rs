// Bounded numeric controls and settings.
//
// The cloud stores integers. Durations are entered in minutes and stored
// in seconds, VPD values are entered in kPa and stored in tenths.

use acinfinity_api::keys::{control, setting};

use super::{Description, EntityContext, EntityKind, EntityValue, Source, to_wire};
use crate::command::KeyValues;
use crate::error::CoreError;
use crate::model::PortMode;

const AUTO: &[PortMode] = &[PortMode::Auto];
const VPD: &[PortMode] = &[PortMode::Vpd];

const fn number(
    source: Source,
    key: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    step: f64,
) -> Description {
    Description::new(EntityKind::Number, source, key, label, plain)
        .range(min, max, step)
        .set(set_plain)
}

const fn minutes(key: &'static str, label: &'static str, mode: &'static [PortMode]) -> Description {
    number(Source::PortControl, key, label, 0.0, 1440.0, 1.0)
        .modes(mode)
        .unit("min")
        .get(seconds_as_minutes)
        .set(set_minutes_as_seconds)
}

const fn tenths(source: Source, key: &'static str, label: &'static str, max: f64) -> Description {
    number(source, key, label, 0.0, max, 0.1).get(tenths_value).set(set_tenths)
}

const fn auto_temperature(key: &'static str, label: &'static str) -> Description {
    number(Source::PortControl, key, label, 0.0, 90.0, 1.0)
        .modes(AUTO)
        .device_class("temperature")
        .unit("°C")
        .get(plain)
        .set(set_with_fahrenheit_twin)
}

pub(super) static DESCRIPTIONS: &[Description] = &[
    // ── controller settings ──
    number(
        Source::ControllerSetting,
        setting::CALIBRATE_TEMP,
        "Temperature Calibration",
        -20.0,
        20.0,
        1.0,
    )
    .celsius_limit(10.0)
    .get(calibration)
    .set(set_calibration),
    number(
        Source::ControllerSetting,
        setting::CALIBRATE_HUMIDITY,
        "Humidity Calibration",
        -10.0,
        10.0,
        1.0,
    ),
    number(
        Source::ControllerSetting,
        setting::VPD_LEAF_TEMP_OFFSET,
        "VPD Leaf Temperature Offset",
        -20.0,
        20.0,
        1.0,
    )
    .celsius_limit(10.0)
    .get(leaf_offset)
    .set(set_leaf_offset),
    // ── port controls ──
    number(Source::PortControl, control::ON_SPEED, "On Power", 0.0, 10.0, 1.0),
    number(Source::PortControl, control::OFF_SPEED, "Off Power", 0.0, 10.0, 1.0),
    minutes(control::TIMER_DURATION_TO_ON, "Minutes to On", &[PortMode::TimerToOn]),
    minutes(control::TIMER_DURATION_TO_OFF, "Minutes to Off", &[PortMode::TimerToOff]),
    minutes(control::CYCLE_DURATION_ON, "Cycle Minutes On", &[PortMode::Cycle]),
    minutes(control::CYCLE_DURATION_OFF, "Cycle Minutes Off", &[PortMode::Cycle]),
    tenths(Source::PortControl, control::VPD_LOW_TRIGGER, "VPD Low Trigger", 9.9)
        .modes(VPD)
        .unit("kPa"),
    tenths(Source::PortControl, control::VPD_HIGH_TRIGGER, "VPD High Trigger", 9.9)
        .modes(VPD)
        .unit("kPa"),
    tenths(Source::PortControl, control::VPD_TARGET, "Target VPD", 9.9)
        .modes(VPD)
        .unit("kPa"),
    number(
        Source::PortControl,
        control::AUTO_HUMIDITY_LOW_TRIGGER,
        "Low Humidity Trigger",
        0.0,
        100.0,
        1.0,
    )
    .modes(AUTO)
    .unit("%"),
    number(
        Source::PortControl,
        control::AUTO_HUMIDITY_HIGH_TRIGGER,
        "High Humidity Trigger",
        0.0,
        100.0,
        1.0,
    )
    .modes(AUTO)
    .unit("%"),
    number(
        Source::PortControl,
        control::AUTO_TARGET_HUMIDITY,
        "Target Humidity",
        0.0,
        100.0,
        1.0,
    )
    .modes(AUTO)
    .unit("%"),
    auto_temperature(control::AUTO_TEMP_LOW_TRIGGER, "Low Temp Trigger"),
    auto_temperature(control::AUTO_TEMP_HIGH_TRIGGER, "High Temp Trigger"),
    auto_temperature(control::AUTO_TARGET_TEMP, "Target Temp"),
    // ── port settings ──
    number(
        Source::PortSetting,
        setting::DYNAMIC_TRANSITION_TEMP,
        "Dynamic Transition Temp",
        0.0,
        20.0,
        1.0,
    )
    .celsius_limit(10.0)
    .get(dynamic_temperature)
    .set(set_dynamic_temperature),
    number(
        Source::PortSetting,
        setting::DYNAMIC_TRANSITION_HUMIDITY,
        "Dynamic Transition Humidity",
        0.0,
        10.0,
        1.0,
    ),
    tenths(
        Source::PortSetting,
        setting::DYNAMIC_TRANSITION_VPD,
        "Dynamic Transition VPD",
        1.0,
    ),
    number(
        Source::PortSetting,
        setting::DYNAMIC_BUFFER_TEMP,
        "Dynamic Buffer Temp",
        0.0,
        20.0,
        1.0,
    )
    .celsius_limit(10.0)
    .get(dynamic_temperature)
    .set(set_dynamic_temperature),
    number(
        Source::PortSetting,
        setting::DYNAMIC_BUFFER_HUMIDITY,
        "Dynamic Buffer Humidity",
        0.0,
        10.0,
        1.0,
    ),
    tenths(Source::PortSetting, setting::DYNAMIC_BUFFER_VPD, "Dynamic Buffer VPD", 1.0),
    number(
        Source::PortSetting,
        setting::SUNRISE_TIMER_DURATION,
        "Sunrise/Sunset Minutes",
        0.0,
        360.0,
        1.0,
    )
    .unit("min")
    .suitable(sunrise_control_exists),
];

// ── Reading ──────────────────────────────────────────────────────────

fn read(ctx: &EntityContext<'_>, key: &str) -> f64 {
    ctx.float(key).unwrap_or(0.0)
}

fn plain(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Float(read(ctx, ctx.key()))
}

fn seconds_as_minutes(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Float(read(ctx, ctx.key()) / 60.0)
}

fn tenths_value(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Float(read(ctx, ctx.key()) / 10.0)
}

/// The Celsius or Fahrenheit key of a pair, by display unit.
fn unit_key(ctx: &EntityContext<'_>, celsius: &'static str, fahrenheit: &'static str) -> &'static str {
    if ctx.is_celsius() { celsius } else { fahrenheit }
}

fn calibration(ctx: &EntityContext<'_>) -> EntityValue {
    let key = unit_key(ctx, setting::CALIBRATE_TEMP, setting::CALIBRATE_TEMP_F);
    EntityValue::Float(read(ctx, key))
}

fn leaf_offset(ctx: &EntityContext<'_>) -> EntityValue {
    let key = unit_key(ctx, setting::VPD_LEAF_TEMP_OFFSET, setting::VPD_LEAF_TEMP_OFFSET_F);
    EntityValue::Float(read(ctx, key))
}

fn dynamic_temperature(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Float(read(ctx, fahrenheit_twin(ctx)))
}

/// The key matching the display unit for `devTt`/`devBt`.
fn fahrenheit_twin(ctx: &EntityContext<'_>) -> &'static str {
    match ctx.key() {
        setting::DYNAMIC_BUFFER_TEMP => unit_key(
            ctx,
            setting::DYNAMIC_BUFFER_TEMP,
            setting::DYNAMIC_BUFFER_TEMP_F,
        ),
        _ => unit_key(
            ctx,
            setting::DYNAMIC_TRANSITION_TEMP,
            setting::DYNAMIC_TRANSITION_TEMP_F,
        ),
    }
}

/// The sunrise duration is shown only where the port controls carry it.
fn sunrise_control_exists(ctx: &EntityContext<'_>) -> bool {
    ctx.snapshot
        .port_control_exists(ctx.device_id(), ctx.port(), setting::SUNRISE_TIMER_DURATION)
}

// ── Writing ──────────────────────────────────────────────────────────

fn requested(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<f64, CoreError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ctx.invalid(format!("expected a number, got {value}")))
}

fn set_plain(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    Ok(vec![(ctx.key(), to_wire(requested(ctx, value)?))])
}

fn set_minutes_as_seconds(
    ctx: &EntityContext<'_>,
    value: &EntityValue,
) -> Result<KeyValues, CoreError> {
    Ok(vec![(ctx.key(), to_wire(requested(ctx, value)? * 60.0))])
}

fn set_tenths(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    Ok(vec![(ctx.key(), to_wire(requested(ctx, value)? * 10.0))])
}

/// Bounded to ±10 in Celsius even if the caller saw the Fahrenheit range.
fn celsius_clamped(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<i64, CoreError> {
    let v = to_wire(requested(ctx, value)?);
    Ok(if ctx.is_celsius() { v.clamp(-10, 10) } else { v })
}

fn set_calibration(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    let v = celsius_clamped(ctx, value)?;
    Ok(if ctx.is_celsius() {
        vec![(setting::CALIBRATE_TEMP, v), (setting::CALIBRATE_TEMP_F, 0)]
    } else {
        vec![(setting::CALIBRATE_TEMP, 0), (setting::CALIBRATE_TEMP_F, v)]
    })
}

fn set_leaf_offset(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    let v = celsius_clamped(ctx, value)?;
    let key = unit_key(ctx, setting::VPD_LEAF_TEMP_OFFSET, setting::VPD_LEAF_TEMP_OFFSET_F);
    Ok(vec![(key, v)])
}

/// Auto-mode temperatures are entered in Celsius; the Fahrenheit field
/// must be written alongside.
fn set_with_fahrenheit_twin(
    ctx: &EntityContext<'_>,
    value: &EntityValue,
) -> Result<KeyValues, CoreError> {
    let celsius = requested(ctx, value)?;
    let twin = match ctx.key() {
        control::AUTO_TEMP_LOW_TRIGGER => control::AUTO_TEMP_LOW_TRIGGER_F,
        control::AUTO_TEMP_HIGH_TRIGGER => control::AUTO_TEMP_HIGH_TRIGGER_F,
        _ => control::AUTO_TARGET_TEMP_F,
    };
    Ok(vec![
        (ctx.key(), to_wire(celsius)),
        (twin, to_wire(celsius * 1.8 + 32.0)),
    ])
}

/// Both unit fields of a dynamic temperature are written; a Celsius
/// degree counts as two Fahrenheit steps.
fn set_dynamic_temperature(
    ctx: &EntityContext<'_>,
    value: &EntityValue,
) -> Result<KeyValues, CoreError> {
    let mut v = to_wire(requested(ctx, value)?);
    let (celsius_key, fahrenheit_key) = match ctx.key() {
        setting::DYNAMIC_BUFFER_TEMP => (setting::DYNAMIC_BUFFER_TEMP, setting::DYNAMIC_BUFFER_TEMP_F),
        _ => (setting::DYNAMIC_TRANSITION_TEMP, setting::DYNAMIC_TRANSITION_TEMP_F),
    };

    Ok(if ctx.is_celsius() {
        v = v.min(10);
        vec![(celsius_key, v), (fahrenheit_key, v * 2)]
    } else {
        vec![(celsius_key, v.div_euclid(2)), (fahrenheit_key, v)]
    })
}
