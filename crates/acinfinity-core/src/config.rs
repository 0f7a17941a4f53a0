// ── Runtime coordinator configuration ──
//
// These types describe *how* to poll one AC Infinity account. They carry
// credentials and tuning but never touch disk; the CLI builds a
// `CoordinatorConfig` from its profile and hands it in.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use url::Url;

/// Polling intervals below this are rejected.
pub const MIN_POLLING_INTERVAL_SECS: u64 = 5;
/// Polling interval used when none is configured.
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 10;
/// Bound on one complete refresh cycle, retries included.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Which half of the entity tree an entity belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    /// Read-only readings: sensors and binary sensors.
    Sensors,
    /// Port mode controls (`getdevModeSettingList`).
    Controls,
    /// Controller and port advanced settings (`getDevSetting`).
    Settings,
}

/// Per-controller choice of which entity categories to expose.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntitySelection {
    #[default]
    All,
    SensorsOnly,
    ControlsOnly,
    SettingsOnly,
    SensorsAndControls,
    SensorsAndSettings,
    ControlsAndSettings,
    Disable,
}

impl EntitySelection {
    /// Whether entities of `category` are created under this selection.
    pub fn includes(self, category: EntityCategory) -> bool {
        use EntityCategory::{Controls, Sensors, Settings};

        match self {
            Self::All => true,
            Self::Disable => false,
            Self::SensorsOnly => category == Sensors,
            Self::ControlsOnly => category == Controls,
            Self::SettingsOnly => category == Settings,
            Self::SensorsAndControls => matches!(category, Sensors | Controls),
            Self::SensorsAndSettings => matches!(category, Sensors | Settings),
            Self::ControlsAndSettings => matches!(category, Controls | Settings),
        }
    }
}

/// Retry behaviour shared by refreshes and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first failure.
    pub max_retries: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(1),
        }
    }
}

/// Configuration for polling a single AC Infinity account.
///
/// Built by the CLI, passed to `Coordinator`; core never reads config files.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Cloud API host.
    pub base_url: Url,
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: SecretString,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// How often the background task refreshes. Zero disables polling.
    pub polling_interval: Duration,
    /// Bound on one refresh cycle, retries included.
    pub update_timeout: Duration,
    pub retry: RetryPolicy,
    /// Entity selection keyed by controller device id. Controllers not
    /// listed get [`EntitySelection::All`].
    pub controller_entities: HashMap<String, EntitySelection>,
}

impl CoordinatorConfig {
    pub fn new(base_url: Url, email: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            email: email.into(),
            password,
            timeout: acinfinity_api::transport::DEFAULT_TIMEOUT,
            polling_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS),
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
            retry: RetryPolicy::default(),
            controller_entities: HashMap::new(),
        }
    }

    /// The entity selection for one controller.
    pub fn selection_for(&self, device_id: &str) -> EntitySelection {
        self.controller_entities
            .get(device_id)
            .copied()
            .unwrap_or_default()
    }
}
