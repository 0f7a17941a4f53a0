// ── Account setup validation ──
//
// Checks run before an account is saved or its options are changed:
// a login plus one controller listing, and the polling interval bound.
// Failures are reported as stable keys attached to a form field.

use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::SecretString;
use serde::Serialize;
use strum::IntoStaticStr;
use tracing::error;
use url::Url;

use acinfinity_api::{AcInfinityClient, TransportConfig};

use crate::DOMAIN;
use crate::config::{DEFAULT_POLLING_INTERVAL_SECS, MIN_POLLING_INTERVAL_SECS};

/// Field key for errors not tied to one input.
pub const FIELD_BASE: &str = "base";
pub const FIELD_POLLING_INTERVAL: &str = "polling_interval";
pub const FIELD_UPDATE_PASSWORD: &str = "update_password";

/// Why a setup or options form was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr, thiserror::Error)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlowError {
    #[error("Failed to connect to the AC Infinity cloud")]
    CannotConnect,
    #[error("Invalid e-mail or password")]
    InvalidAuth,
    #[error("Unexpected error")]
    Unknown,
    #[error("Polling interval must be at least {} seconds", MIN_POLLING_INTERVAL_SECS)]
    InvalidPollingInterval,
}

impl FlowError {
    /// Stable key, e.g. `invalid_auth`.
    pub fn key(self) -> &'static str {
        self.into()
    }
}

fn classify(err: &acinfinity_api::Error) -> FlowError {
    use acinfinity_api::Error as Api;

    match err {
        Api::InvalidAuth { .. } => FlowError::InvalidAuth,
        Api::CannotConnect { .. } | Api::NotLoggedIn | Api::Transport(_) => {
            FlowError::CannotConnect
        }
        other => {
            error!(error = %other, "Unexpected exception");
            FlowError::Unknown
        }
    }
}

/// Identity under which an account is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryIdentity {
    pub unique_id: String,
    pub title: String,
}

impl EntryIdentity {
    pub fn for_email(email: &str) -> Self {
        Self {
            unique_id: format!("{DOMAIN}-{email}"),
            title: format!("AC Infinity ({email})"),
        }
    }
}

/// Log in and list controllers with the given credentials.
pub async fn validate_credentials(
    base_url: &Url,
    email: &str,
    password: &SecretString,
    timeout: Duration,
) -> Result<EntryIdentity, FlowError> {
    let transport = TransportConfig::default().with_timeout(timeout);
    let client = AcInfinityClient::new(
        base_url.clone(),
        email.to_owned(),
        password.clone(),
        &transport,
    )
    .map_err(|e| classify(&e))?;

    client.login().await.map_err(|e| classify(&e))?;
    client.devices_list_all().await.map_err(|e| classify(&e))?;

    Ok(EntryIdentity::for_email(email))
}

pub fn validate_polling_interval(seconds: u64) -> Result<u64, FlowError> {
    if seconds < MIN_POLLING_INTERVAL_SECS {
        return Err(FlowError::InvalidPollingInterval);
    }
    Ok(seconds)
}

/// Raw options form input.
#[derive(Debug, Clone, Default)]
pub struct OptionsInput {
    pub polling_interval: Option<u64>,
    /// A new password to validate and store.
    pub update_password: Option<SecretString>,
}

/// Validated options, ready to persist.
#[derive(Debug, Clone)]
pub struct OptionsUpdate {
    pub polling_interval: u64,
    pub password: Option<SecretString>,
}

/// Per-field errors of a rejected options form.
pub type FieldErrors = BTreeMap<&'static str, FlowError>;

/// Validate an options change. All fields are checked; errors are keyed
/// by the field they belong to.
pub async fn validate_options(
    base_url: &Url,
    email: &str,
    input: OptionsInput,
    timeout: Duration,
) -> Result<OptionsUpdate, FieldErrors> {
    let mut errors = FieldErrors::new();
    let polling_interval = input
        .polling_interval
        .unwrap_or(DEFAULT_POLLING_INTERVAL_SECS);

    if let Err(e) = validate_polling_interval(polling_interval) {
        errors.insert(FIELD_POLLING_INTERVAL, e);
    }

    if let Some(password) = &input.update_password {
        if let Err(e) = validate_credentials(base_url, email, password, timeout).await {
            errors.insert(FIELD_UPDATE_PASSWORD, e);
        }
    }

    if errors.is_empty() {
        Ok(OptionsUpdate {
            polling_interval,
            password: input.update_password,
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn polling_interval_minimum_is_five_seconds() {
        assert_eq!(
            validate_polling_interval(4),
            Err(FlowError::InvalidPollingInterval)
        );
        assert_eq!(validate_polling_interval(5), Ok(5));
        assert_eq!(validate_polling_interval(600), Ok(600));
    }

    #[test]
    fn error_keys_are_snake_case() {
        assert_eq!(FlowError::CannotConnect.key(), "cannot_connect");
        assert_eq!(FlowError::InvalidAuth.key(), "invalid_auth");
        assert_eq!(FlowError::InvalidPollingInterval.key(), "invalid_polling_interval");
    }

    #[test]
    fn entry_identity_uses_email() {
        let identity = EntryIdentity::for_email("grower@example.com");
        assert_eq!(identity.unique_id, "ac_infinity-grower@example.com");
        assert_eq!(identity.title, "AC Infinity (grower@example.com)");
    }

    #[tokio::test]
    async fn options_without_password_skip_the_network() {
        let url = Url::parse("http://127.0.0.1:9").unwrap();
        let update = validate_options(
            &url,
            "a@b.c",
            OptionsInput {
                polling_interval: Some(30),
                update_password: None,
            },
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(update.polling_interval, 30);
        assert!(update.password.is_none());

        let errors = validate_options(
            &url,
            "a@b.c",
            OptionsInput {
                polling_interval: Some(2),
                update_password: None,
            },
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert_eq!(
            errors.get(FIELD_POLLING_INTERVAL),
            Some(&FlowError::InvalidPollingInterval)
        );
    }
}
