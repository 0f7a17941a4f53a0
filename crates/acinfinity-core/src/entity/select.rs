// Option lists backed by integer codes.

use acinfinity_api::keys::{control, setting};

use super::{Description, EntityContext, EntityKind, EntityValue, Source};
use crate::command::KeyValues;
use crate::error::CoreError;
use crate::model::PortMode;

const OUTSIDE_CLIMATE: &[&str] = &["Neutral", "Lower", "Higher"];
const SETTINGS_MODE: &[&str] = &["Auto", "Target"];
const DYNAMIC_RESPONSE: &[&str] = &["Transition", "Buffer"];
const UNKNOWN_LOAD_TYPE: &str = "Unknown Device Type";

/// Load type codes the app offers.
const LOAD_TYPES: &[(i64, &str)] = &[
    (1, "Grow Light"),
    (2, "Humidifier"),
    (4, "Heater"),
    (5, "AC"),
    (6, "Fan"),
];
const LOAD_TYPE_LABELS: &[&str] = &["Grow Light", "Humidifier", "Heater", "AC", "Fan"];

const fn indexed(
    source: Source,
    key: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> Description {
    Description::new(EntityKind::Select, source, key, label, index_value)
        .options(options)
        .set(set_index)
}

pub(super) static DESCRIPTIONS: &[Description] = &[
    indexed(
        Source::ControllerSetting,
        setting::OUTSIDE_TEMP_COMPARE,
        "Outside Climate Temperature",
        OUTSIDE_CLIMATE,
    ),
    indexed(
        Source::ControllerSetting,
        setting::OUTSIDE_HUMIDITY_COMPARE,
        "Outside Climate Humidity",
        OUTSIDE_CLIMATE,
    ),
    Description::new(
        EntityKind::Select,
        Source::PortControl,
        control::AT_TYPE,
        "Active Mode",
        active_mode,
    )
    .options(&PortMode::LABELS)
    .set(set_active_mode),
    indexed(
        Source::PortControl,
        control::AUTO_SETTINGS_MODE,
        "Auto Settings Mode",
        SETTINGS_MODE,
    )
    .modes(&[PortMode::Auto]),
    indexed(
        Source::PortControl,
        control::VPD_SETTINGS_MODE,
        "VPD Settings Mode",
        SETTINGS_MODE,
    )
    .modes(&[PortMode::Vpd]),
    Description::new(
        EntityKind::Select,
        Source::PortSetting,
        setting::DEVICE_LOAD_TYPE,
        "Device Type",
        load_type,
    )
    .options(LOAD_TYPE_LABELS)
    .set(set_load_type),
    indexed(
        Source::PortSetting,
        setting::DYNAMIC_RESPONSE_TYPE,
        "Dynamic Response",
        DYNAMIC_RESPONSE,
    ),
];

fn options(ctx: &EntityContext<'_>) -> &'static [&'static str] {
    ctx.description.options.unwrap_or_default()
}

fn chosen<'v>(ctx: &EntityContext<'_>, value: &'v EntityValue) -> Result<&'v str, CoreError> {
    value
        .as_text()
        .ok_or_else(|| ctx.invalid(format!("expected an option, got {value}")))
}

fn position(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<usize, CoreError> {
    let choice = chosen(ctx, value)?;
    options(ctx)
        .iter()
        .position(|o| *o == choice)
        .ok_or_else(|| ctx.invalid(format!("unknown option '{choice}'")))
}

fn option_at(ctx: &EntityContext<'_>, index: i64) -> EntityValue {
    usize::try_from(index)
        .ok()
        .and_then(|i| options(ctx).get(i))
        .map_or(EntityValue::None, |o| EntityValue::Text((*o).to_owned()))
}

fn as_code(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// 0-based index into the option list.
fn index_value(ctx: &EntityContext<'_>) -> EntityValue {
    option_at(ctx, ctx.int_or_zero())
}

fn set_index(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    Ok(vec![(ctx.key(), as_code(position(ctx, value)?))])
}

/// `atType` is 1-based.
fn active_mode(ctx: &EntityContext<'_>) -> EntityValue {
    option_at(ctx, ctx.int(ctx.key()).unwrap_or(1) - 1)
}

fn set_active_mode(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    Ok(vec![(control::AT_TYPE, as_code(position(ctx, value)?) + 1)])
}

fn load_type(ctx: &EntityContext<'_>) -> EntityValue {
    let code = ctx.int(ctx.key()).unwrap_or(1);
    let label = LOAD_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(UNKNOWN_LOAD_TYPE, |(_, label)| label);
    EntityValue::Text(label.to_owned())
}

fn set_load_type(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    let choice = chosen(ctx, value)?;
    LOAD_TYPES
        .iter()
        .find(|(_, label)| *label == choice)
        .map(|(code, _)| vec![(setting::DEVICE_LOAD_TYPE, *code)])
        .ok_or_else(|| ctx.invalid(format!("Unknown Device Type: {choice}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::EntitySelection;
    use crate::command::Command;
    use crate::entity::{Entity, discover};
    use crate::store::Snapshot;
    use crate::testing::{DEVICE_ID, Fixture};

    fn with_entity<T>(entity_id: &str, f: impl FnOnce(&Snapshot, &Entity) -> T) -> T {
        let snapshot = Fixture::load().build();
        let discovery = discover(&snapshot, |_| EntitySelection::All);
        f(&snapshot, discovery.find(entity_id).unwrap())
    }

    fn text(s: &str) -> EntityValue {
        EntityValue::Text(s.to_owned())
    }

    #[test]
    fn load_type_labels_match_codes() {
        for (code, label) in LOAD_TYPES {
            assert!(LOAD_TYPE_LABELS.contains(label), "{code} missing");
        }
        assert_eq!(LOAD_TYPES.len(), LOAD_TYPE_LABELS.len());
    }

    #[test]
    fn active_mode_is_one_based() {
        with_entity("select.ac_infinity_2B120D62DC00_port_1_atType", |snap, e| {
            assert_eq!(e.value(snap, Utc::now()), text("Auto"));
            let value = e.parse(snap, "vpd").unwrap();
            assert_eq!(value, text("VPD"));
            assert_eq!(
                e.build_command(snap, &value).unwrap(),
                Command::UpdatePortControls {
                    controller_id: DEVICE_ID.into(),
                    port: 1,
                    values: vec![("atType", 8)],
                }
            );
        });
    }

    #[test]
    fn outside_climate_is_a_controller_setting() {
        with_entity("select.ac_infinity_2B120D62DC00_tempCompare", |snap, e| {
            assert_eq!(e.value(snap, Utc::now()), text("Lower"));
            assert_eq!(
                e.build_command(snap, &text("Higher")).unwrap(),
                Command::UpdateControllerSettings {
                    controller_id: DEVICE_ID.into(),
                    values: vec![("tempCompare", 2)],
                }
            );
        });
    }

    #[test]
    fn out_of_range_index_reads_as_none() {
        // humiCompare is 7 in the fixture
        with_entity("select.ac_infinity_2B120D62DC00_humiCompare", |snap, e| {
            assert_eq!(e.value(snap, Utc::now()), EntityValue::None);
        });
    }

    #[test]
    fn load_type_uses_reverse_lookup() {
        with_entity("select.ac_infinity_2B120D62DC00_port_1_loadType", |snap, e| {
            assert_eq!(e.value(snap, Utc::now()), text("Grow Light"));
            assert_eq!(
                e.build_command(snap, &text("Heater")).unwrap(),
                Command::UpdatePortSettings {
                    controller_id: DEVICE_ID.into(),
                    port: 1,
                    values: vec![("loadType", 4)],
                }
            );
            assert!(e.build_command(snap, &text("Toaster")).is_err());
        });
        with_entity("select.ac_infinity_2B120D62DC00_port_2_loadType", |snap, e| {
            assert_eq!(e.value(snap, Utc::now()), text(UNKNOWN_LOAD_TYPE));
        });
    }

    #[test]
    fn parse_rejects_unknown_options() {
        with_entity("select.ac_infinity_2B120D62DC00_port_1_isFlag", |snap, e| {
            assert_eq!(e.parse(snap, "BUFFER").unwrap(), text("Buffer"));
            assert!(e.parse(snap, "Sideways").is_err());
        });
    }
}
