//! Build-master connection settings

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Build master serving the `/json/builders` listing.
pub const DEFAULT_MASTER_URL: &str = "http://108.170.217.252:10117";

/// Path of the builder listing on the build master.
pub const DEFAULT_BUILDERS_PATH: &str = "/json/builders";

/// Hosted code-review settings naming the trusted try server.
pub const DEFAULT_SETTINGS_URL: &str = "http://skia.googlecode.com/svn/trunk/codereview.settings";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

const USER_AGENT: &str = concat!("tryjob-buildmaster-client/", env!("CARGO_PKG_VERSION"));

/// Build-master configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMasterConfig {
    /// Base URL of the build master (scheme, host and port)
    pub master_url: String,
    /// Path of the builder listing, joined onto `master_url`
    pub builders_path: String,
    /// Full URL of the `codereview.settings` resource
    pub settings_url: String,
    /// Timeout applied to every request
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for BuildMasterConfig {
    fn default() -> Self {
        BuildMasterConfig {
            master_url: DEFAULT_MASTER_URL.to_string(),
            builders_path: DEFAULT_BUILDERS_PATH.to_string(),
            settings_url: DEFAULT_SETTINGS_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl BuildMasterConfig {
    /// Create a config from environment variables, falling back to defaults
    ///
    /// Reads `TRYJOB_BUILD_MASTER`, `TRYJOB_SETTINGS_URL` and
    /// `TRYJOB_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("TRYJOB_BUILD_MASTER") {
            config.master_url = url;
        }
        if let Ok(url) = std::env::var("TRYJOB_SETTINGS_URL") {
            config.settings_url = url;
        }
        if let Ok(raw) = std::env::var("TRYJOB_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => warn!(
                    value = %raw,
                    "ignoring invalid TRYJOB_HTTP_TIMEOUT_SECS, using {}s",
                    config.timeout_secs
                ),
            }
        }
        config
    }

    /// Create config for a specific build master and settings location
    pub fn new(master_url: &str, settings_url: &str) -> Self {
        BuildMasterConfig {
            master_url: master_url.to_string(),
            settings_url: settings_url.to_string(),
            ..Self::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the builder listing
    pub fn builders_url(&self) -> String {
        format!(
            "{}/{}",
            self.master_url.trim_end_matches('/'),
            self.builders_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = BuildMasterConfig::default();
        assert_eq!(config.master_url, DEFAULT_MASTER_URL);
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert!(config.user_agent.starts_with("tryjob-buildmaster-client/"));
    }

    #[test]
    fn test_builders_url_joins_without_double_slash() {
        let config = BuildMasterConfig::new("http://master:10117/", "http://host/settings");
        assert_eq!(config.builders_url(), "http://master:10117/json/builders");
    }

    #[test]
    fn test_with_timeout_never_zero() {
        let config = BuildMasterConfig::default().with_timeout(Duration::from_millis(10));
        assert_eq!(config.timeout_secs, 1);
    }
}
