// Port toggles: trigger enables, schedules and the sunrise timer.

use acinfinity_api::keys::{
    SCHEDULE_DISABLED_VALUE, SCHEDULE_EOD_VALUE, SCHEDULE_MIDNIGHT_VALUE, control, setting,
};

use super::{Description, EntityContext, EntityKind, EntityValue, Source};
use crate::command::KeyValues;
use crate::error::CoreError;
use crate::model::PortMode;

const VPD: &[PortMode] = &[PortMode::Vpd];
const AUTO: &[PortMode] = &[PortMode::Auto];
const SCHEDULE: &[PortMode] = &[PortMode::Schedule];

const fn flag(
    source: Source,
    key: &'static str,
    label: &'static str,
    modes: &'static [PortMode],
) -> Description {
    Description::new(EntityKind::Switch, source, key, label, flag_value)
        .device_class("switch")
        .modes(modes)
        .set(set_flag)
}

const fn schedule(key: &'static str, label: &'static str) -> Description {
    Description::new(
        EntityKind::Switch,
        Source::PortControl,
        key,
        label,
        schedule_enabled,
    )
    .device_class("switch")
    .modes(SCHEDULE)
    .set(set_schedule)
}

pub(super) static DESCRIPTIONS: &[Description] = &[
    flag(Source::PortControl, control::VPD_HIGH_ENABLED, "VPD High Trigger Enabled", VPD),
    flag(Source::PortControl, control::VPD_LOW_ENABLED, "VPD Low Trigger Enabled", VPD),
    flag(Source::PortControl, control::VPD_TARGET_ENABLED, "Target VPD Enabled", VPD),
    flag(Source::PortControl, control::AUTO_TEMP_HIGH_ENABLED, "High Temp Trigger Enabled", AUTO),
    flag(Source::PortControl, control::AUTO_TEMP_LOW_ENABLED, "Low Temp Trigger Enabled", AUTO),
    flag(
        Source::PortControl,
        control::AUTO_HUMIDITY_HIGH_ENABLED,
        "High Humidity Trigger Enabled",
        AUTO,
    ),
    flag(
        Source::PortControl,
        control::AUTO_HUMIDITY_LOW_ENABLED,
        "Low Humidity Trigger Enabled",
        AUTO,
    ),
    flag(Source::PortControl, control::AUTO_TARGET_TEMP_ENABLED, "Target Temp Enabled", AUTO),
    flag(
        Source::PortControl,
        control::AUTO_TARGET_HUMIDITY_ENABLED,
        "Target Humidity Enabled",
        AUTO,
    ),
    schedule(control::SCHEDULED_START_TIME, "Scheduled On-Time Enabled"),
    schedule(control::SCHEDULED_END_TIME, "Scheduled Off-Time Enabled"),
    flag(Source::PortSetting, setting::SUNRISE_TIMER_ENABLED, "Sunrise/Sunset Enabled", &[]),
];

fn flag_value(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Bool(ctx.int_or_zero() != 0)
}

fn requested(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<bool, CoreError> {
    value
        .as_bool()
        .ok_or_else(|| ctx.invalid(format!("expected on or off, got {value}")))
}

fn set_flag(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    let on = requested(ctx, value)?;
    Ok(vec![(ctx.key(), i64::from(on))])
}

/// A schedule is on while it holds a minute of the day.
fn schedule_enabled(ctx: &EntityContext<'_>) -> EntityValue {
    let minutes = ctx.int(ctx.key()).unwrap_or(SCHEDULE_DISABLED_VALUE);
    EntityValue::Bool(minutes <= SCHEDULE_EOD_VALUE)
}

/// Switching on starts the day at midnight or ends it at 23:59.
fn set_schedule(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    let minutes = match (requested(ctx, value)?, ctx.key()) {
        (false, _) => SCHEDULE_DISABLED_VALUE,
        (true, control::SCHEDULED_START_TIME) => SCHEDULE_MIDNIGHT_VALUE,
        (true, _) => SCHEDULE_EOD_VALUE,
    };
    Ok(vec![(ctx.key(), minutes)])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use crate::EntitySelection;
    use crate::command::Command;
    use crate::entity::{EntityValue, discover};
    use crate::store::Snapshot;
    use crate::testing::{DEVICE_ID, Fixture};

    fn with_entity<T>(entity_id: &str, f: impl FnOnce(&Snapshot, &crate::entity::Entity) -> T) -> T {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, |_| EntitySelection::All);
        f(&snapshot, discovery.find(entity_id).unwrap())
    }

    #[test]
    fn flags_read_as_booleans() {
        with_entity("switch.ac_infinity_2B120D62DC00_port_1_activeHt", |snap, e| {
            assert_eq!(e.value(snap, Utc::now()), EntityValue::Bool(true));
        });
        with_entity("switch.ac_infinity_2B120D62DC00_port_1_activeLt", |snap, e| {
            assert_eq!(e.value(snap, Utc::now()), EntityValue::Bool(false));
        });
    }

    #[test]
    fn flag_write_targets_port_controls() {
        with_entity("switch.ac_infinity_2B120D62DC00_port_1_activeLt", |snap, e| {
            let value = e.parse(snap, "on").unwrap();
            assert_eq!(
                e.build_command(snap, &value).unwrap(),
                Command::UpdatePortControls {
                    controller_id: DEVICE_ID.into(),
                    port: 1,
                    values: vec![("activeLt", 1)],
                }
            );
        });
    }

    #[test]
    fn schedules_are_on_below_the_sentinel() {
        // start 480 (08:00), end 65535 (disabled)
        with_entity(
            "switch.ac_infinity_2B120D62DC00_port_1_schedStartTime",
            |snap, e| assert_eq!(e.value(snap, Utc::now()), EntityValue::Bool(true)),
        );
        with_entity(
            "switch.ac_infinity_2B120D62DC00_port_1_schedEndtTime",
            |snap, e| assert_eq!(e.value(snap, Utc::now()), EntityValue::Bool(false)),
        );
    }

    #[test]
    fn schedule_writes_day_bounds_or_sentinel() {
        with_entity(
            "switch.ac_infinity_2B120D62DC00_port_1_schedEndtTime",
            |snap, e| {
                let on = e.build_command(snap, &EntityValue::Bool(true)).unwrap();
                assert!(matches!(on, Command::UpdatePortControls { ref values, .. } if values == &vec![("schedEndtTime", 1439)]));
            },
        );
        with_entity(
            "switch.ac_infinity_2B120D62DC00_port_1_schedStartTime",
            |snap, e| {
                let on = e.build_command(snap, &EntityValue::Bool(true)).unwrap();
                assert!(matches!(on, Command::UpdatePortControls { ref values, .. } if values == &vec![("schedStartTime", 0)]));
                let off = e.build_command(snap, &EntityValue::Bool(false)).unwrap();
                assert!(matches!(off, Command::UpdatePortControls { ref values, .. } if values == &vec![("schedStartTime", 65535)]));
            },
        );
    }

    #[test]
    fn sunrise_switch_is_a_port_setting() {
        with_entity(
            "switch.ac_infinity_2B120D62DC00_port_1_onTimeSwitch",
            |snap, e| {
                assert_eq!(e.value(snap, Utc::now()), EntityValue::Bool(true));
                assert_eq!(
                    e.build_command(snap, &EntityValue::Bool(false)).unwrap(),
                    Command::UpdatePortSettings {
                        controller_id: DEVICE_ID.into(),
                        port: 1,
                        values: vec![("onTimeSwitch", 0)],
                    }
                );
            },
        );
    }

    #[test]
    fn rejects_non_boolean_input() {
        with_entity("switch.ac_infinity_2B120D62DC00_port_1_activeHt", |snap, e| {
            assert!(e.parse(snap, "sometimes").is_err());
        });
    }
}
