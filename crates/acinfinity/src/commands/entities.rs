//! Entity command handlers.

use std::sync::Arc;

use tabled::Tabled;

use acinfinity_core::{Coordinator, CoordinatorConfig, CoreError, EntityState};

use crate::cli::{EntitiesArgs, EntitiesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct EntityRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Access")]
    access: &'static str,
}

pub(super) fn row(state: &Arc<EntityState>, color: bool) -> EntityRow {
    let value = util::display_value(state);
    let value = if !state.available {
        output::status("unavailable", false, color)
    } else if state.live {
        value
    } else {
        output::muted(&value, color)
    };

    EntityRow {
        entity_id: state.entity_id.clone(),
        name: state.name.clone(),
        value,
        category: state.category.to_string(),
        access: if state.writable { "rw" } else { "ro" },
    }
}

fn detail(state: &Arc<EntityState>) -> String {
    let mut lines = vec![
        format!("Entity:    {}", state.entity_id),
        format!("Unique ID: {}", state.unique_id),
        format!("Name:      {}", state.name),
        format!("Value:     {}", util::display_value(state)),
        format!("Kind:      {}", state.kind),
        format!("Category:  {}", state.category),
        format!("Device:    {} ({})", state.device.name, state.device.model),
        format!("Available: {}", state.available),
    ];
    if state.writable {
        lines.push(format!("Live:      {}", state.live));
    }
    if let Some(range) = state.range {
        lines.push(format!(
            "Range:     {}..={} step {}",
            range.min, range.max, range.step
        ));
    }
    if let Some(options) = state.options {
        lines.push(format!("Options:   {}", options.join(", ")));
    }
    if let Some(class) = state.device_class {
        lines.push(format!("Class:     {class}"));
    }
    lines.join("\n")
}

/// The published state behind `identifier`, or why there is none.
fn lookup(coordinator: &Coordinator, identifier: &str) -> Result<Arc<EntityState>, CoreError> {
    if let Some(state) = coordinator.entity(identifier) {
        return Ok(state);
    }
    let entity = coordinator.store().resolve(identifier)?;
    coordinator
        .entity(&entity.entity_id)
        .ok_or(CoreError::EntityNotFound {
            unique_id: entity.unique_id,
        })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: CoordinatorConfig,
    args: EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let coordinator = util::connect(config, global).await?;
    let result = run(&coordinator, args, global).await;
    coordinator.disconnect().await;

    let out = result?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn run(
    coordinator: &Coordinator,
    args: EntitiesArgs,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let color = output::should_color(global.color);

    match args.command {
        EntitiesCommand::List(filter) => {
            let selection = util::Selection::new(&filter, &coordinator.controllers())?;
            let states: Vec<Arc<EntityState>> = coordinator
                .entities_snapshot()
                .iter()
                .filter(|s| selection.matches(s))
                .cloned()
                .collect();
            output::render_list(
                global.output,
                &states,
                |s| row(s, color),
                |s| s.entity_id.clone(),
            )
        }

        EntitiesCommand::Get { entity } => {
            let state = lookup(coordinator, &entity)?;
            output::render_single(global.output, &state, detail, |s| s.value.to_string())
        }

        EntitiesCommand::Set { entity, value } => {
            coordinator.set_entity_value(&entity, &value).await?;
            let state = lookup(coordinator, &entity)?;
            if !global.quiet {
                eprintln!("✓ {} set to {}", state.entity_id, util::display_value(&state));
            }
            output::render_single(global.output, &state, detail, |s| s.value.to_string())
        }
    }
}
