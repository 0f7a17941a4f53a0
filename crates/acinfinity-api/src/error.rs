use thiserror::Error;

/// Top-level error type for the `acinfinity-api` crate.
///
/// The cloud answers every call with an HTTP 200 and a JSON envelope
/// carrying its own `code`; the variants below separate the transport
/// failures from the envelope-level rejections. `acinfinity-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connectivity ────────────────────────────────────────────────
    /// The server answered with a non-200 HTTP status.
    #[error("Cannot connect to the AC Infinity API (HTTP {status})")]
    CannotConnect { status: u16 },

    /// A data call was attempted before `login()` succeeded.
    #[error("AC Infinity client is not logged in")]
    NotLoggedIn,

    // ── Authentication ──────────────────────────────────────────────
    /// The login endpoint rejected the e-mail/password pair.
    #[error("Invalid credentials: {message}")]
    InvalidAuth { message: String },

    // ── Envelope ────────────────────────────────────────────────────
    /// A non-login endpoint answered with `code != 200`.
    #[error("Request to {path} failed (code {code}): {message}")]
    RequestFailed {
        path: String,
        code: i64,
        message: String,
        body: String,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The reqwest client could not be built from the transport config.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A fetched payload is missing a field the write call depends on.
    #[error("Malformed payload: {field} {reason}")]
    MalformedPayload { field: String, reason: String },
}

impl Error {
    /// Returns `true` if this error came from the login endpoint rejecting
    /// the credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::InvalidAuth { .. })
    }
}
