//! Client configuration

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `STOREFRONT_API_URL`
pub const ENV_PREFIX: &str = "STOREFRONT";

/// Storefront client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API origin every request path is appended to
    pub api_url: String,

    /// Seconds between background session refresh pings
    pub keepalive_secs: u64,

    /// Request timeout in seconds (transport default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request
    pub user_agent: String,

    /// Where the session flag and cookies are persisted
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            keepalive_secs: 50,
            timeout_secs: None,
            user_agent: concat!("storefront-client/", env!("CARGO_PKG_VERSION")).to_string(),
            session_file: default_data_dir().join("session.json"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from defaults, an optional TOML file, and
    /// `STOREFRONT_*` environment variables, in increasing precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("keepalive_secs", defaults.keepalive_secs)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default(
                "session_file",
                defaults.session_file.to_string_lossy().to_string(),
            )?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration with defaults and environment variables only
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub const fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Per-user data directory for storefront state
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storefront")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_backend_expectations() {
        let config = ClientConfig::default();
        assert_eq!(config.keepalive_interval(), Duration::from_secs(50));
        assert_eq!(config.timeout(), None);
        assert!(config.session_file.ends_with("storefront/session.json"));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_url = \"https://shop.example.com\"\nkeepalive_secs = 20\ntimeout_secs = 15"
        )
        .unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_url, "https://shop.example.com");
        assert_eq!(config.keepalive_interval(), Duration::from_secs(20));
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.user_agent, ClientConfig::default().user_agent);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.keepalive_secs, 50);
    }
}
