//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::str::FromStr;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use acinfinity_core::{
    ControllerRef, Coordinator, CoordinatorConfig, EntityCategory, EntityKind, EntityState,
};

use crate::cli::{EntityFilter, GlobalOpts};
use crate::error::CliError;

/// A stderr spinner, hidden when quiet or not attached to a terminal.
pub fn spinner(global: &GlobalOpts, message: &'static str) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Connect for a single command: no background polling, spinner while
/// the first refresh runs.
pub async fn connect(
    mut config: CoordinatorConfig,
    global: &GlobalOpts,
) -> Result<Coordinator, CliError> {
    config.polling_interval = Duration::ZERO;
    let coordinator = Coordinator::new(config)?;

    let bar = spinner(global, "Connecting to AC Infinity");
    let connected = coordinator.connect().await;
    bar.finish_and_clear();
    connected?;
    Ok(coordinator)
}

/// Find a controller by device id, MAC address or name.
pub fn find_controller<'a>(
    controllers: &'a [ControllerRef],
    identifier: &str,
) -> Result<&'a ControllerRef, CliError> {
    controllers
        .iter()
        .find(|c| {
            c.id == identifier
                || c.mac.eq_ignore_ascii_case(identifier)
                || c.name.eq_ignore_ascii_case(identifier)
        })
        .ok_or_else(|| CliError::NotFound {
            resource_type: "controller".into(),
            identifier: identifier.into(),
            list_command: "controllers list".into(),
        })
}

// ── Entity filtering ────────────────────────────────────────────────

/// An `EntityFilter` with its strings parsed and the controller resolved.
#[derive(Debug, Default)]
pub struct Selection {
    controller_id: Option<String>,
    kind: Option<EntityKind>,
    category: Option<EntityCategory>,
    live_only: bool,
}

impl Selection {
    pub fn new(filter: &EntityFilter, controllers: &[ControllerRef]) -> Result<Self, CliError> {
        let controller_id = filter
            .controller
            .as_deref()
            .map(|c| find_controller(controllers, c).map(|c| c.id.clone()))
            .transpose()?;
        let kind = filter
            .kind
            .as_deref()
            .map(|k| parse_choice::<EntityKind>("kind", k))
            .transpose()?;
        let category = filter
            .category
            .as_deref()
            .map(|c| parse_choice::<EntityCategory>("category", c))
            .transpose()?;

        Ok(Self {
            controller_id,
            kind,
            category,
            live_only: filter.live_only,
        })
    }

    pub fn matches(&self, state: &EntityState) -> bool {
        self.controller_id
            .as_ref()
            .is_none_or(|id| *id == state.controller_id)
            && self.kind.is_none_or(|k| k == state.kind)
            && self.category.is_none_or(|c| c == state.category)
            && (!self.live_only || state.live)
    }
}

/// Parse a strum enum, listing the accepted spellings on failure.
pub fn parse_choice<T>(field: &str, raw: &str) -> Result<T, CliError>
where
    T: FromStr + strum::IntoEnumIterator + std::fmt::Display,
{
    T::from_str(raw.trim()).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!(
            "'{raw}' is not one of: {}",
            T::iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
        ),
    })
}

/// Value with its unit, e.g. `24.17 °F`.
pub fn display_value(state: &EntityState) -> String {
    match state.unit {
        Some(unit) if !state.value.is_none() => format!("{} {unit}", state.value),
        _ => state.value.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use acinfinity_core::EntitySelection;

    #[test]
    fn parse_choice_lists_options() {
        assert_eq!(
            parse_choice::<EntityKind>("kind", "binary_sensor").unwrap(),
            EntityKind::BinarySensor
        );
        assert_eq!(
            parse_choice::<EntitySelection>("selection", "sensors_only").unwrap(),
            EntitySelection::SensorsOnly
        );
        let err = parse_choice::<EntityCategory>("category", "gadgets").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("sensors, controls, settings"), "{text}");
    }

    #[test]
    fn empty_filter_matches_nothing_out() {
        let selection = Selection::new(&EntityFilter::default(), &[]).unwrap();
        assert!(selection.controller_id.is_none());
        assert!(!selection.live_only);
    }

    #[test]
    fn unknown_controller_is_not_found() {
        let filter = EntityFilter {
            controller: Some("nope".into()),
            ..EntityFilter::default()
        };
        assert!(matches!(
            Selection::new(&filter, &[]),
            Err(CliError::NotFound { .. })
        ));
    }
}
