//! Controller command handlers.

use tabled::Tabled;

use acinfinity_core::{ControllerRef, Coordinator, CoordinatorConfig};

use crate::cli::{ControllersArgs, ControllersCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ControllerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Ports")]
    ports: usize,
    #[tabled(rename = "Sensors")]
    sensors: usize,
}

fn row(c: &ControllerRef, color: bool) -> ControllerRow {
    ControllerRow {
        id: c.id.clone(),
        name: c.name.clone(),
        model: c.controller_type.model(),
        mac: c.mac.clone(),
        state: online(c.online, color),
        unit: c.temperature_unit.to_string(),
        ports: c.ports.len(),
        sensors: c.sensors.len(),
    }
}

fn online(online: bool, color: bool) -> String {
    output::status(if online { "online" } else { "offline" }, online, color)
}

fn detail(c: &ControllerRef, color: bool) -> String {
    let mut lines = vec![
        format!("ID:        {}", c.id),
        format!("Name:      {}", c.name),
        format!("MAC:       {}", c.mac),
        format!("Model:     {}", c.controller_type.model()),
        format!("State:     {}", online(c.online, color)),
        format!("Unit:      {}", c.temperature_unit),
        format!("Time zone: {}", c.time_zone.as_deref().unwrap_or("-")),
        format!("Firmware:  {}", c.sw_version.as_deref().unwrap_or("-")),
        format!("Hardware:  {}", c.hw_version.as_deref().unwrap_or("-")),
    ];
    for port in &c.ports {
        let mode = port
            .active_mode
            .map_or_else(|| output::muted("-", color), |m| m.to_string());
        lines.push(format!(
            "Port {}:    {} ({}, {mode})",
            port.index,
            port.name,
            online(port.online, color)
        ));
    }
    for sensor in &c.sensors {
        lines.push(format!(
            "Sensor {}:  {}",
            sensor.access_port,
            sensor.device_info(c).name
        ));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: CoordinatorConfig,
    args: ControllersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let spinner = util::spinner(global, "Connecting to AC Infinity");
    let connected = spinner.clone();
    let controllers = Coordinator::oneshot(config, |c| async move {
        connected.finish_and_clear();
        Ok(c.controllers())
    })
    .await;
    spinner.finish_and_clear();
    let controllers = controllers?;
    let color = output::should_color(global.color);

    let out = match args.command {
        ControllersCommand::List => output::render_list(
            global.output,
            &controllers,
            |c| row(c, color),
            |c| c.id.clone(),
        )?,
        ControllersCommand::Get { controller } => {
            let found = util::find_controller(&controllers, &controller)?;
            output::render_single(global.output, found, |c| detail(c, color), |c| c.id.clone())?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
