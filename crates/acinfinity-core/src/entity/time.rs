// Schedule start and end times, stored as minutes after midnight.

use chrono::{NaiveTime, Timelike};

use acinfinity_api::keys::{SCHEDULE_DISABLED_VALUE, control};

use super::{Description, EntityContext, EntityKind, EntityValue, Source};
use crate::command::KeyValues;
use crate::error::CoreError;
use crate::model::PortMode;

const SCHEDULE: &[PortMode] = &[PortMode::Schedule];

const fn schedule(key: &'static str, label: &'static str) -> Description {
    Description::new(EntityKind::Time, Source::PortControl, key, label, minutes_to_time)
        .modes(SCHEDULE)
        .set(set_time)
}

pub(super) static DESCRIPTIONS: &[Description] = &[
    schedule(control::SCHEDULED_START_TIME, "Scheduled On-Time"),
    schedule(control::SCHEDULED_END_TIME, "Scheduled Off-Time"),
];

/// `None` for a disabled schedule (65535) or anything past 23:59.
fn minutes_to_time(ctx: &EntityContext<'_>) -> EntityValue {
    let Some(minutes) = ctx.int(ctx.key()) else {
        return EntityValue::None;
    };
    let (hours, minutes) = (minutes.div_euclid(60), minutes.rem_euclid(60));
    if !(0..=23).contains(&hours) {
        return EntityValue::None;
    }
    u32::try_from(hours)
        .ok()
        .zip(u32::try_from(minutes).ok())
        .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .map_or(EntityValue::None, EntityValue::Time)
}

fn set_time(ctx: &EntityContext<'_>, value: &EntityValue) -> Result<KeyValues, CoreError> {
    let minutes = match value {
        EntityValue::None => SCHEDULE_DISABLED_VALUE,
        EntityValue::Time(t) => i64::from(t.hour() * 60 + t.minute()),
        other => return Err(ctx.invalid(format!("expected HH:MM, got {other}"))),
    };
    Ok(vec![(ctx.key(), minutes)])
}
