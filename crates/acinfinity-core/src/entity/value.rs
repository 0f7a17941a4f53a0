// ── Entity values ──
//
// What an entity displays and what a user may write back. Parsing lives
// here so the CLI and the coordinator agree on accepted spellings.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveTime, Timelike};
use serde::Serialize;

use super::{Entity, EntityKind, NumberRange};
use crate::error::CoreError;

/// A typed entity value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Time(NaiveTime),
    Timestamp(DateTime<FixedOffset>),
    None,
}

impl EntityValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("on"),
            Self::Bool(false) => f.write_str("off"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M")),
            Self::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
            Self::None => f.write_str("none"),
        }
    }
}

// ── Parsing user input ───────────────────────────────────────────────

impl Entity {
    /// Parse and validate a raw user value for this entity.
    ///
    /// `range` is the effective range under the controller's current
    /// temperature unit.
    pub(crate) fn parse_value(
        &self,
        raw: &str,
        range: Option<NumberRange>,
    ) -> Result<EntityValue, CoreError> {
        let raw = raw.trim();
        let invalid = |reason: String| CoreError::InvalidValue {
            unique_id: self.unique_id.clone(),
            reason,
        };

        match self.description.kind {
            EntityKind::Sensor | EntityKind::BinarySensor => Err(CoreError::ReadOnly {
                unique_id: self.unique_id.clone(),
            }),
            EntityKind::Switch => parse_bool(raw)
                .map(EntityValue::Bool)
                .ok_or_else(|| invalid(format!("expected on or off, got '{raw}'"))),
            EntityKind::Number => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| invalid(format!("'{raw}' is not a number")))?;
                if let Some(range) = range {
                    if !value.is_finite() || value < range.min || value > range.max {
                        return Err(invalid(format!(
                            "{value} is outside {}..={}",
                            range.min, range.max
                        )));
                    }
                }
                Ok(EntityValue::Float(value))
            }
            EntityKind::Select => {
                let options = self.description.options.unwrap_or_default();
                options
                    .iter()
                    .find(|option| option.eq_ignore_ascii_case(raw))
                    .map(|option| EntityValue::Text((*option).to_owned()))
                    .ok_or_else(|| {
                        invalid(format!("expected one of: {}", options.join(", ")))
                    })
            }
            EntityKind::Time => parse_time(raw)
                .ok_or_else(|| invalid(format!("expected HH:MM or none, got '{raw}'"))),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_time(raw: &str) -> Option<EntityValue> {
    if raw.is_empty() || ["none", "off", "disabled"].contains(&raw.to_ascii_lowercase().as_str())
    {
        return Some(EntityValue::None);
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
        .map(EntityValue::Time)
}
