//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use acinfinity_config::ConfigError;
use acinfinity_core::{CoreError, FlowError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the AC Infinity cloud: {reason}")]
    #[diagnostic(
        code(acinfinity::cannot_connect),
        help(
            "Check your network connection and the cloud host.\n\
             Try again with -vv to see each request."
        )
    )]
    CannotConnect { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(acinfinity::invalid_auth),
        help(
            "Verify the e-mail and password you use in the AC Infinity app.\n\
             Run: acinfinity config set-password"
        )
    )]
    InvalidAuth { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(acinfinity::no_credentials),
        help(
            "Configure credentials with: acinfinity config init\n\
             Or set the ACINFINITY_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Setup validation ─────────────────────────────────────────────

    #[error("{field}: {}", key.key())]
    #[diagnostic(code(acinfinity::setup), help("{key}"))]
    Setup { field: String, key: FlowError },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(acinfinity::not_found),
        help("Run: acinfinity {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("'{identifier}' matches several entities: {candidates}")]
    #[diagnostic(
        code(acinfinity::ambiguous),
        help("Use the full entity id, e.g. switch.<unique id> or time.<unique id>")
    )]
    Ambiguous {
        identifier: String,
        candidates: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(acinfinity::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(acinfinity::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(acinfinity::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: acinfinity config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No account configured")]
    #[diagnostic(
        code(acinfinity::no_config),
        help(
            "Create a profile with: acinfinity config init\n\
             Or pass --email and --password. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(acinfinity::config))]
    Config { message: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out: {reason}")]
    #[diagnostic(
        code(acinfinity::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    Timeout { reason: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(acinfinity::render))]
    Render(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(acinfinity::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CannotConnect { .. } => exit_code::CONNECTION,
            Self::InvalidAuth { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Setup { key, .. } => match key {
                FlowError::InvalidAuth => exit_code::AUTH,
                FlowError::CannotConnect => exit_code::CONNECTION,
                FlowError::InvalidPollingInterval => exit_code::USAGE,
                FlowError::Unknown => exit_code::GENERAL,
            },
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Ambiguous { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CannotConnect { reason } => CliError::CannotConnect { reason },

            CoreError::InvalidAuth { message } => CliError::InvalidAuth { message },

            CoreError::Disconnected => CliError::CannotConnect {
                reason: "the coordinator is not connected".into(),
            },

            CoreError::Timeout { reason } => CliError::Timeout { reason },

            CoreError::RequestFailed {
                path,
                code,
                message,
            } => CliError::ApiError {
                code: code.to_string(),
                message: format!("{path}: {message}"),
            },

            CoreError::UpdateFailed { message } => CliError::ApiError {
                code: "update_failed".into(),
                message,
            },

            CoreError::EntityNotFound { unique_id } => CliError::NotFound {
                resource_type: "entity".into(),
                identifier: unique_id,
                list_command: "entities list".into(),
            },

            CoreError::AmbiguousEntity {
                identifier,
                candidates,
            } => CliError::Ambiguous {
                identifier,
                candidates: candidates.join(", "),
            },

            CoreError::ControllerNotFound { identifier } => CliError::NotFound {
                resource_type: "controller".into(),
                identifier,
                list_command: "controllers list".into(),
            },

            CoreError::ReadOnly { unique_id } => CliError::Validation {
                field: unique_id,
                reason: "entity is read-only".into(),
            },

            CoreError::InvalidValue { unique_id, reason } => CliError::Validation {
                field: unique_id,
                reason,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::InvalidPollingInterval { .. } => CliError::Setup {
                field: "polling_interval".into(),
                key: FlowError::InvalidPollingInterval,
            },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(see: acinfinity config profiles)".into(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
