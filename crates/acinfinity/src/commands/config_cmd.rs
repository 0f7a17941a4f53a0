//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::SecretString;

use acinfinity_core::setup::{self, FIELD_BASE, FIELD_POLLING_INTERVAL, OptionsInput};
use acinfinity_core::{CoordinatorConfig, EntitySelection};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

/// Format config for display. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "polling_interval = {}", cfg.defaults.polling_interval);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "email = \"{}\"", p.email);
        if let Some(ref pw) = p.password {
            let _ = writeln!(out, "password = \"{pw}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref host) = p.host {
            let _ = writeln!(out, "host = \"{host}\"");
        }
        if let Some(interval) = p.polling_interval {
            let _ = writeln!(out, "polling_interval = {interval}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if !p.controllers.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "[profiles.{name}.controllers]");
            for (id, selection) in &p.controllers {
                let _ = writeln!(out, "\"{id}\" = \"{selection}\"");
            }
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_password(label: &str) -> Result<String, CliError> {
    let password = rpassword::prompt_password(label).map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(password)
}

/// Offer keyring or plaintext storage. Returns the plaintext to save in
/// the profile, or `None` once stored in the keyring.
fn prompt_password_storage(profile_name: &str, password: String) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        acinfinity_config::store_password(profile_name, &SecretString::from(password))?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password))
    }
}

/// Load the config and the profile a `config set-*` command targets.
fn target_profile(global: &GlobalOpts) -> Result<(Config, String), CliError> {
    let cfg = config::load_config_or_default(global);
    let name = config::active_profile_name(global, &cfg);
    if !cfg.profiles.contains_key(&name) {
        return Err(CliError::ProfileNotFound {
            available: config::available_profiles(&cfg),
            name,
        });
    }
    Ok((cfg, name))
}

/// Connection settings for a credential check against `profile`.
fn check_config(
    profile: &Profile,
    cfg: &Config,
    password: &str,
) -> Result<CoordinatorConfig, CliError> {
    Ok(acinfinity_config::coordinator_config(
        profile,
        &cfg.defaults,
        SecretString::from(password.to_owned()),
    )?)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path(global);
            eprintln!("AC Infinity: configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default(global);

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(config::active_profile_name(global, &cfg))
                .interact_text()
                .map_err(prompt_err)?;

            let email: String = Input::new()
                .with_prompt("E-mail")
                .interact_text()
                .map_err(prompt_err)?;
            let email = email.trim().to_owned();

            let password = prompt_password("Password: ")?;

            let mut profile = Profile::new(email);
            profile.host.clone_from(&global.host);
            profile.timeout = global.timeout;
            let check = check_config(&profile, &cfg, &password)?;

            let bar = util::spinner(global, "Checking credentials");
            let identity = setup::validate_credentials(
                &check.base_url,
                &check.email,
                &check.password,
                check.timeout,
            )
            .await;
            bar.finish_and_clear();
            let identity = identity.map_err(|key| CliError::Setup {
                field: FIELD_BASE.into(),
                key,
            })?;

            let interval: u64 = Input::new()
                .with_prompt("Polling interval (seconds)")
                .default(cfg.defaults.polling_interval)
                .interact_text()
                .map_err(prompt_err)?;
            setup::validate_polling_interval(interval).map_err(|key| CliError::Setup {
                field: FIELD_POLLING_INTERVAL.into(),
                key,
            })?;
            if interval != cfg.defaults.polling_interval {
                profile.polling_interval = Some(interval);
            }

            profile.password = prompt_password_storage(&profile_name, password)?;

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = config::save_config(global, &cfg)?;

            eprintln!("\n✓ {} configured", identity.title);
            eprintln!("  Written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: acinfinity controllers list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default(global));
            let out = output::render_single(global.output, &cfg, format_config, |_| {
                config::config_path(global).display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default(global);
            let default = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: acinfinity config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if *name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", profile.email);
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default(global);

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(global, &cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let (mut cfg, name) = target_profile(global)?;
            let password = match global.password.clone() {
                Some(pw) => pw,
                None => prompt_password("New password: ")?,
            };

            let (_, effective) = config::resolve_profile(global, &cfg)?;
            let check = check_config(&effective, &cfg, &password)?;
            let bar = util::spinner(global, "Checking credentials");
            let validated = setup::validate_options(
                &check.base_url,
                &check.email,
                OptionsInput {
                    polling_interval: effective.polling_interval,
                    update_password: Some(check.password.clone()),
                },
                check.timeout,
            )
            .await;
            bar.finish_and_clear();

            if let Err(errors) = validated {
                if let Some((field, key)) = errors.into_iter().next() {
                    return Err(CliError::Setup {
                        field: field.into(),
                        key,
                    });
                }
            }

            // Keep plaintext profiles plaintext; everything else goes to the keyring.
            let profile = cfg.profile_mut(&name)?;
            if profile.password.is_some() {
                profile.password = Some(password);
                config::save_config(global, &cfg)?;
                eprintln!("✓ Password updated in config for profile '{name}'");
            } else {
                acinfinity_config::store_password(&name, &SecretString::from(password))?;
                eprintln!("✓ Password stored in system keyring for profile '{name}'");
            }
            Ok(())
        }

        // ── SetPollingInterval ──────────────────────────────────────
        ConfigCommand::SetPollingInterval { seconds } => {
            let (mut cfg, name) = target_profile(global)?;
            cfg.profile_mut(&name)?.set_polling_interval(seconds)?;
            config::save_config(global, &cfg)?;
            eprintln!("✓ Polling interval of '{name}' set to {seconds} seconds");
            Ok(())
        }

        // ── SetEntities ─────────────────────────────────────────────
        ConfigCommand::SetEntities {
            controller,
            selection,
        } => {
            let selection = util::parse_choice::<EntitySelection>("selection", &selection)?;
            let (mut cfg, name) = target_profile(global)?;
            cfg.profile_mut(&name)?.set_entities(&controller, selection);
            config::save_config(global, &cfg)?;
            eprintln!("✓ Controller {controller} of '{name}' exposes: {selection}");
            Ok(())
        }
    }
}
