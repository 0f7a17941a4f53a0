//! CLI configuration: thin wrapper around `acinfinity_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--email, --password, --host, --timeout).

use std::path::PathBuf;

use secrecy::SecretString;

use acinfinity_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use acinfinity_config::{Config, Defaults, Profile};

// ── File location ───────────────────────────────────────────────────

/// The config file in use: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(acinfinity_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(acinfinity_config::load_config_from(&config_path(global))?)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default(global: &GlobalOpts) -> Config {
    load_config(global).unwrap_or_default()
}

pub fn save_config(global: &GlobalOpts, cfg: &Config) -> Result<PathBuf, CliError> {
    let path = config_path(global);
    acinfinity_config::save_config_to(cfg, &path)?;
    Ok(path)
}

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile with flag overrides applied.
///
/// Without a stored profile, `--email` alone is enough to build one.
pub fn resolve_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, cfg);

    let mut profile = match (cfg.profiles.get(&name), &global.email) {
        (Some(profile), _) => profile.clone(),
        (None, Some(email)) => Profile::new(email.clone()),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(cfg),
                name,
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path(global).display().to_string(),
            });
        }
    };

    if let Some(ref email) = global.email {
        profile.email.clone_from(email);
    }
    if let Some(ref host) = global.host {
        profile.host = Some(host.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok((name, profile))
}

/// Password from `--password` / `ACINFINITY_PASSWORD`, then the profile chain.
pub fn resolve_password(
    global: &GlobalOpts,
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, CliError> {
    if let Some(ref pw) = global.password {
        return Ok(SecretString::from(pw.clone()));
    }
    Ok(acinfinity_config::resolve_password(profile, profile_name)?)
}

/// Build a `CoordinatorConfig` from the config file, profile, and flags.
pub fn build_coordinator_config(global: &GlobalOpts) -> Result<CoordinatorConfig, CliError> {
    let cfg = load_config(global)?;
    let (name, profile) = resolve_profile(global, &cfg)?;
    let password = resolve_password(global, &profile, &name)?;
    Ok(acinfinity_config::coordinator_config(
        &profile,
        &cfg.defaults,
        password,
    )?)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
