//! `watch`: keep the coordinator polling and print entity changes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tracing::debug;

use acinfinity_core::{Coordinator, CoordinatorConfig, EntityState};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::entities::row;
use super::util;

/// One line of watch output.
#[derive(Debug, Serialize)]
struct Change<'a> {
    time: String,
    entity_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    old: Option<&'a str>,
    new: String,
    available: bool,
}

impl Change<'_> {
    fn render(&self, format: OutputFormat) -> Result<String, CliError> {
        match format {
            OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(self, true),
            _ => Ok(format!(
                "{} {}: {} → {}",
                self.time,
                self.entity_id,
                self.old.unwrap_or("-"),
                self.new
            )),
        }
    }
}

/// What a change is detected on.
fn shown(state: &EntityState) -> String {
    if state.available {
        util::display_value(state)
    } else {
        "unavailable".into()
    }
}

pub async fn handle(
    mut config: CoordinatorConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(seconds) = args.interval {
        let seconds = acinfinity_config::validate_polling_interval(seconds)?;
        config.polling_interval = Duration::from_secs(seconds);
    }

    let coordinator = Coordinator::new(config)?;
    let bar = util::spinner(global, "Connecting to AC Infinity");
    let connected = coordinator.connect().await;
    bar.finish_and_clear();
    connected?;

    let result = watch(&coordinator, &args, global).await;
    coordinator.disconnect().await;
    result
}

async fn watch(
    coordinator: &Coordinator,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let selection = util::Selection::new(&args.filter, &coordinator.controllers())?;
    let color = output::should_color(global.color);
    let mut stream = coordinator.entities();

    let initial: Vec<Arc<EntityState>> = stream
        .current()
        .iter()
        .filter(|s| selection.matches(s))
        .cloned()
        .collect();
    let out = output::render_list(
        global.output,
        &initial,
        |s| row(s, color),
        |s| format!("{} {}", s.entity_id, shown(s)),
    )?;
    output::print_output(&out, global.quiet);

    let mut previous: HashMap<String, String> = initial
        .iter()
        .map(|s| (s.entity_id.clone(), shown(s)))
        .collect();

    if !global.quiet {
        eprintln!(
            "Watching {} entities every {}s. Press Ctrl-C to stop.",
            previous.len(),
            coordinator.polling_interval().as_secs()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = stream.changed() => {
                let Some(states) = changed else { break };
                let time = Local::now().format("%H:%M:%S").to_string();

                for state in states.iter().filter(|s| selection.matches(s)) {
                    let now = shown(state);
                    let old = previous.get(&state.entity_id);
                    if old == Some(&now) {
                        continue;
                    }
                    let change = Change {
                        time: time.clone(),
                        entity_id: &state.entity_id,
                        old: old.map(String::as_str),
                        new: now.clone(),
                        available: state.available,
                    };
                    output::print_output(&change.render(global.output)?, false);
                    previous.insert(state.entity_id.clone(), now);
                }
                debug!(entities = states.len(), "snapshot published");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn change_lines() {
        let change = Change {
            time: "12:00:00".into(),
            entity_id: "sensor.ac_infinity_2B120D62DC00_temperature",
            old: Some("24.17 °C"),
            new: "24.5 °C".into(),
            available: true,
        };
        assert_eq!(
            change.render(OutputFormat::Table).unwrap(),
            "12:00:00 sensor.ac_infinity_2B120D62DC00_temperature: 24.17 °C → 24.5 °C"
        );
        let json: serde_json::Value =
            serde_json::from_str(&change.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["new"], "24.5 °C");
        assert_eq!(json["available"], true);
    }
}
