// Shared transport configuration for building reqwest::Client instances.
//
// The cloud only accepts requests that look like they came from the
// vendor's mobile app, so the user agent is part of the config rather
// than a crate-wide constant.

use std::time::Duration;

/// User agent of the iOS app the cloud API was built for.
pub const APP_USER_AGENT: &str =
    "ACController/1.8.2 (com.acinfinity.humiture; build:489; iOS 16.5.1) Alamofire/5.4.4";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: APP_USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mimics_mobile_app() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert!(cfg.user_agent.starts_with("ACController/"));
    }

    #[test]
    fn with_timeout_overrides() {
        let cfg = TransportConfig::default().with_timeout(Duration::from_secs(3));
        assert_eq!(cfg.timeout, Duration::from_secs(3));
    }
}
