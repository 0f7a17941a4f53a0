//! Configuration for the acinfinity CLI.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! polling interval validation, and translation to
//! `acinfinity_core::CoordinatorConfig`. The CLI adds flag-aware wrappers
//! on top.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use acinfinity_core::config::{DEFAULT_POLLING_INTERVAL_SECS, MIN_POLLING_INTERVAL_SECS};
use acinfinity_core::{CoordinatorConfig, EntitySelection};

/// Prefix of every environment override, e.g. `ACINFINITY_DEFAULTS__TIMEOUT`.
pub const ENV_PREFIX: &str = "ACINFINITY_";
/// Password override checked before any profile source.
pub const PASSWORD_ENV: &str = "ACINFINITY_PASSWORD";
/// Keyring service under which passwords are stored.
pub const KEYRING_SERVICE: &str = "acinfinity";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(
        "polling interval must be at least {} seconds, got {value}",
        MIN_POLLING_INTERVAL_SECS
    )]
    InvalidPollingInterval { value: u64 },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Pick a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|profile| (name.to_owned(), profile))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    pub fn profile_mut(&mut self, name: &str) -> Result<&mut Profile, ConfigError> {
        self.profiles
            .get_mut(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            polling_interval: default_polling_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_polling_interval() -> u64 {
    DEFAULT_POLLING_INTERVAL_SECS
}

/// A named AC Infinity account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Account e-mail.
    pub email: String,

    /// Password (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Cloud host override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Override polling interval (seconds, >= 5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<u64>,

    /// Override timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Entity selection per controller device id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub controllers: BTreeMap<String, EntitySelection>,
}

impl Profile {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// The polling interval in effect, validated.
    pub fn polling_interval(&self, defaults: &Defaults) -> Result<u64, ConfigError> {
        validate_polling_interval(self.polling_interval.unwrap_or(defaults.polling_interval))
    }

    /// Set the polling interval after validating it.
    pub fn set_polling_interval(&mut self, seconds: u64) -> Result<(), ConfigError> {
        self.polling_interval = Some(validate_polling_interval(seconds)?);
        Ok(())
    }

    /// Record the entity selection for one controller. `All` is the
    /// default and is not stored.
    pub fn set_entities(&mut self, controller_id: &str, selection: EntitySelection) {
        if selection == EntitySelection::All {
            self.controllers.remove(controller_id);
        } else {
            self.controllers.insert(controller_id.to_owned(), selection);
        }
    }
}

pub fn validate_polling_interval(seconds: u64) -> Result<u64, ConfigError> {
    if seconds < MIN_POLLING_INTERVAL_SECS {
        return Err(ConfigError::InvalidPollingInterval { value: seconds });
    }
    Ok(seconds)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "acinfinity", "acinfinity").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("acinfinity");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered defaults → file → `ACINFINITY_` env.
///
/// Nested keys use a double underscore: `ACINFINITY_DEFAULTS__OUTPUT`.
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

/// Resolve a profile's password (no CLI flag step).
///
/// Order: `ACINFINITY_PASSWORD`, the profile's `password_env`, the
/// system keyring, plaintext `password`.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Global env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 2. Profile's password_env
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── CoordinatorConfig translation ───────────────────────────────────

/// Build a `CoordinatorConfig` from a profile and an already-resolved
/// password.
pub fn coordinator_config(
    profile: &Profile,
    defaults: &Defaults,
    password: SecretString,
) -> Result<CoordinatorConfig, ConfigError> {
    let host = profile
        .host
        .as_deref()
        .unwrap_or(acinfinity_api::DEFAULT_HOST);
    let base_url: url::Url = host.parse().map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid URL: {host}"),
    })?;

    if profile.email.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "email".into(),
            reason: "must not be empty".into(),
        });
    }

    let polling_interval = profile.polling_interval(defaults)?;

    let mut config = CoordinatorConfig::new(base_url, profile.email.trim(), password);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.polling_interval = Duration::from_secs(polling_interval);
    config.controller_entities = profile
        .controllers
        .iter()
        .map(|(id, selection)| (id.clone(), *selection))
        .collect::<HashMap<_, _>>();
    Ok(config)
}

/// Build a `CoordinatorConfig` from a profile, resolving its password.
pub fn profile_to_coordinator_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<CoordinatorConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    coordinator_config(profile, defaults, password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
        default_profile = "home"

        [defaults]
        output = "json"
        timeout = 10
        polling_interval = 10

        [profiles.home]
        email = "grower@example.com"
        password_env = "GROW_PASSWORD"
        polling_interval = 15

        [profiles.home.controllers]
        "1424979258063355749" = "sensors_and_controls"

        [profiles.shed]
        email = "shed@example.com"
        password = "plain"
    "#;

    fn password(secret: &SecretString) -> &str {
        secret.expose_secret()
    }

    #[test]
    fn loads_profiles_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let config = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;

            assert_eq!(config.default_profile.as_deref(), Some("home"));
            assert_eq!(config.defaults.output, "json");
            assert_eq!(config.defaults.color, "auto");

            let (name, home) = config.profile(None).map_err(|e| e.to_string())?;
            assert_eq!(name, "home");
            assert_eq!(home.email, "grower@example.com");
            assert_eq!(home.polling_interval, Some(15));
            assert_eq!(
                home.controllers.get("1424979258063355749"),
                Some(&EntitySelection::SensorsAndControls)
            );
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("ACINFINITY_DEFAULT_PROFILE", "shed");
            jail.set_env("ACINFINITY_DEFAULTS__TIMEOUT", "30");

            let config = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.default_profile.as_deref(), Some("shed"));
            assert_eq!(config.defaults.timeout, 30);
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let config = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn password_env_precedes_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("SHED_PW", "from-env");
            let mut profile = Profile::new("shed@example.com");
            profile.password = Some("plain".into());
            profile.password_env = Some("SHED_PW".into());

            let secret = resolve_password(&profile, "jail-shed").map_err(|e| e.to_string())?;
            assert_eq!(password(&secret), "from-env");

            jail.set_env(PASSWORD_ENV, "global");
            let secret = resolve_password(&profile, "jail-shed").map_err(|e| e.to_string())?;
            assert_eq!(password(&secret), "global");
            Ok(())
        });
    }

    #[test]
    fn unset_password_env_falls_through_to_plaintext() {
        // Jail holds the env lock so no other test's variables leak in.
        Jail::expect_with(|_jail| {
            let mut profile = Profile::new("shed@example.com");
            profile.password = Some("plain".into());
            profile.password_env = Some("ACINFINITY_TEST_UNSET_VARIABLE".into());

            let secret =
                resolve_password(&profile, "test-unset-profile").map_err(|e| e.to_string())?;
            assert_eq!(password(&secret), "plain");
            Ok(())
        });
    }

    #[test]
    fn polling_interval_below_five_is_rejected() {
        let mut profile = Profile::new("a@b.c");
        assert!(matches!(
            profile.set_polling_interval(4),
            Err(ConfigError::InvalidPollingInterval { value: 4 })
        ));
        profile.set_polling_interval(5).unwrap();
        assert_eq!(profile.polling_interval(&Defaults::default()).unwrap(), 5);

        profile.polling_interval = Some(1);
        assert!(profile.polling_interval(&Defaults::default()).is_err());
    }

    #[test]
    fn default_selection_is_not_stored() {
        let mut profile = Profile::new("a@b.c");
        profile.set_entities("1", EntitySelection::Disable);
        assert_eq!(profile.controllers.len(), 1);
        profile.set_entities("1", EntitySelection::All);
        assert!(profile.controllers.is_empty());
    }

    #[test]
    fn builds_coordinator_config() {
        let mut profile = Profile::new(" grower@example.com ");
        profile.host = Some("http://127.0.0.1:8080".into());
        profile.polling_interval = Some(15);
        profile.set_entities("42", EntitySelection::SettingsOnly);

        let config = coordinator_config(
            &profile,
            &Defaults::default(),
            SecretString::from("pw".to_owned()),
        )
        .unwrap();

        assert_eq!(config.email, "grower@example.com");
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.polling_interval, Duration::from_secs(15));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.selection_for("42"), EntitySelection::SettingsOnly);
        assert_eq!(config.selection_for("43"), EntitySelection::All);
    }

    #[test]
    fn rejects_bad_host_and_empty_email() {
        let mut profile = Profile::new("a@b.c");
        profile.host = Some("not a url".into());
        let pw = || SecretString::from("pw".to_owned());
        assert!(matches!(
            coordinator_config(&profile, &Defaults::default(), pw()),
            Err(ConfigError::Validation { ref field, .. }) if field == "host"
        ));

        let profile = Profile::new("  ");
        assert!(matches!(
            coordinator_config(&profile, &Defaults::default(), pw()),
            Err(ConfigError::Validation { ref field, .. }) if field == "email"
        ));
    }

    #[test]
    fn save_round_trips_through_tempfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut profile = Profile::new("grower@example.com");
        profile.set_entities("1424979258063355749", EntitySelection::ControlsOnly);
        config.profiles.insert("default".into(), profile);

        save_config_to(&config, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("controls_only"));
        assert!(!written.contains("password"));

        let parsed: Config = toml::from_str(&written).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn unknown_profile_is_reported() {
        let config = Config::default();
        assert!(matches!(
            config.profile(Some("nope")),
            Err(ConfigError::ProfileNotFound { ref name }) if name == "nope"
        ));
    }
}
