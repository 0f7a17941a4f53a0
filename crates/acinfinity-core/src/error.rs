// ── Core error types ──
//
// User-facing errors from acinfinity-core. Consumers never see envelope
// codes or JSON parse failures directly; the `From<acinfinity_api::Error>`
// impl folds transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to the AC Infinity cloud: {reason}")]
    CannotConnect { reason: String },

    #[error("Authentication failed: {message}")]
    InvalidAuth { message: String },

    #[error("Request to {path} failed (code {code}): {message}")]
    RequestFailed {
        path: String,
        code: i64,
        message: String,
    },

    #[error("Coordinator is not connected")]
    Disconnected,

    #[error("Request timed out: {reason}")]
    Timeout { reason: String },

    #[error("Unable to refresh from data update coordinator: {message}")]
    UpdateFailed { message: String },

    // ── Entity errors ────────────────────────────────────────────────
    #[error("Entity not found: {unique_id}")]
    EntityNotFound { unique_id: String },

    #[error("'{identifier}' matches several entities: {}", candidates.join(", "))]
    AmbiguousEntity {
        identifier: String,
        candidates: Vec<String>,
    },

    #[error("Controller not found: {identifier}")]
    ControllerNotFound { identifier: String },

    #[error("Entity {unique_id} is read-only")]
    ReadOnly { unique_id: String },

    #[error("Invalid value for {unique_id}: {reason}")]
    InvalidValue { unique_id: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::CannotConnect { .. }
                | Self::RequestFailed { .. }
                | Self::Timeout { .. }
                | Self::UpdateFailed { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<acinfinity_api::Error> for CoreError {
    fn from(err: acinfinity_api::Error) -> Self {
        use acinfinity_api::Error as Api;

        match err {
            Api::InvalidAuth { message } => CoreError::InvalidAuth { message },
            Api::CannotConnect { status } => CoreError::CannotConnect {
                reason: format!("HTTP {status}"),
            },
            Api::NotLoggedIn => CoreError::CannotConnect {
                reason: "not logged in".into(),
            },
            Api::RequestFailed {
                path,
                code,
                message,
                ..
            } => CoreError::RequestFailed {
                path,
                code,
                message,
            },
            Api::Transport(e) if e.is_timeout() => CoreError::Timeout {
                reason: e.to_string(),
            },
            Api::Transport(e) => CoreError::CannotConnect {
                reason: e.to_string(),
            },
            Api::ClientBuild(message) => CoreError::Internal(message),
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            Api::Deserialization { message, .. } => CoreError::UpdateFailed {
                message: format!("unexpected response: {message}"),
            },
            Api::MalformedPayload { field, reason } => CoreError::UpdateFailed {
                message: format!("{field} {reason}"),
            },
        }
    }
}
