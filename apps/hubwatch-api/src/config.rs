//! # Service Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HUBWATCH_STORAGE__PATH=/var/lib/hubwatch/subscriptions.json        │
//! │     HUBWATCH_RENEWAL__THRESHOLD_HOURS=6                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $HUBWATCH_CONFIG, or ./hubwatch.toml if present                    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [hub]
//! url = "https://pubsubhubbub.appspot.com/subscribe"
//! callback_base_url = "https://hooks.example.com"
//! timeout_secs = 30
//! lease_seconds = 86400
//!
//! [renewal]
//! threshold_hours = 12
//! max_attempts = 3
//!
//! [storage]
//! path = "/var/lib/hubwatch/subscriptions.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use hubwatch_core::{
    FeedUrls, RenewalPolicy, DEFAULT_LEASE_SECONDS, DEFAULT_MAX_RENEWAL_ATTEMPTS,
    DEFAULT_RENEWAL_THRESHOLD_HOURS, MAX_LEASE_SECONDS, MAX_RENEWAL_THRESHOLD_HOURS,
};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "HUBWATCH_CONFIG";

/// Config file read when `HUBWATCH_CONFIG` is unset (optional).
pub const DEFAULT_CONFIG_FILE: &str = "hubwatch.toml";

const ENV_PREFIX: &str = "HUBWATCH";

// =============================================================================
// Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Push hub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSettings {
    /// Hub subscribe endpoint.
    #[serde(default = "default_hub_url")]
    pub url: String,

    /// Public URL of this service; the hub calls back `<base>/callback`.
    #[serde(default = "default_callback_base")]
    pub callback_base_url: String,

    /// Prefix the channel ID is appended to for `hub.topic`.
    #[serde(default = "default_topic_base")]
    pub topic_base_url: String,

    /// Client-side timeout for one hub request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lease requested on subscribe and renewal.
    #[serde(default = "default_lease_seconds")]
    pub lease_seconds: i64,
}

fn default_hub_url() -> String {
    "https://pubsubhubbub.appspot.com/subscribe".to_string()
}

fn default_callback_base() -> String {
    "http://localhost:8080".to_string()
}

fn default_topic_base() -> String {
    "https://www.youtube.com/xml/feeds/videos.xml?channel_id=".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_lease_seconds() -> i64 {
    DEFAULT_LEASE_SECONDS
}

impl Default for HubSettings {
    fn default() -> Self {
        HubSettings {
            url: default_hub_url(),
            callback_base_url: default_callback_base(),
            topic_base_url: default_topic_base(),
            timeout_secs: default_timeout_secs(),
            lease_seconds: default_lease_seconds(),
        }
    }
}

/// Renewal scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalSettings {
    #[serde(default = "default_threshold_hours")]
    pub threshold_hours: i64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_threshold_hours() -> i64 {
    DEFAULT_RENEWAL_THRESHOLD_HOURS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_RENEWAL_ATTEMPTS
}

impl Default for RenewalSettings {
    fn default() -> Self {
        RenewalSettings {
            threshold_hours: default_threshold_hours(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Location of the JSON subscription document.
    ///
    /// Left unset, the service still starts; every store call then fails
    /// with a "not configured" error.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Service Configuration
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub hub: HubSettings,

    #[serde(default)]
    pub renewal: RenewalSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ServiceConfig {
    /// Loads configuration from defaults, the optional TOML file, and the
    /// `HUBWATCH_*` environment.
    pub fn load() -> Result<Self, ConfigError> {
        let (file, required) = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => (path, true),
            Err(_) => (DEFAULT_CONFIG_FILE.to_string(), false),
        };

        debug!(file = %file, required, "Loading configuration");

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&file).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServiceConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string (no environment overlay).
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let config: ServiceConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.renewal.max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "renewal.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.hub.lease_seconds <= 0 || self.hub.lease_seconds > MAX_LEASE_SECONDS {
            return Err(ConfigError::InvalidValue(format!(
                "hub.lease_seconds must be between 1 and {}",
                MAX_LEASE_SECONDS
            )));
        }

        if self.hub.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "hub.timeout_secs must be positive".to_string(),
            ));
        }

        if !(0..=MAX_RENEWAL_THRESHOLD_HOURS).contains(&self.renewal.threshold_hours) {
            return Err(ConfigError::InvalidValue(format!(
                "renewal.threshold_hours must be between 0 and {}",
                MAX_RENEWAL_THRESHOLD_HOURS
            )));
        }

        Ok(())
    }

    /// Renewal policy derived from the hub and renewal sections.
    pub fn renewal_policy(&self) -> RenewalPolicy {
        RenewalPolicy::new(
            self.renewal.threshold_hours,
            self.renewal.max_attempts,
            self.hub.lease_seconds,
        )
    }

    /// Topic/callback URL builder.
    pub fn feed_urls(&self) -> FeedUrls {
        FeedUrls::new(&self.hub.topic_base_url, &self.hub.callback_base_url)
    }

    pub fn hub_timeout(&self) -> Duration {
        Duration::from_secs(self.hub.timeout_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_toml("").unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.hub.timeout_secs, 30);
        assert_eq!(config.hub.lease_seconds, 86_400);
        assert_eq!(config.renewal.threshold_hours, 12);
        assert_eq!(config.renewal.max_attempts, 3);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_toml_overrides() {
        let config = ServiceConfig::from_toml(
            r#"
            [hub]
            callback_base_url = "https://hooks.example.com/"
            lease_seconds = 3600

            [renewal]
            threshold_hours = 2
            max_attempts = 5

            [storage]
            path = "/tmp/subscriptions.json"
            "#,
        )
        .unwrap();

        let policy = config.renewal_policy();
        assert_eq!(policy.threshold, chrono::Duration::hours(2));
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.lease_seconds, 3600);
        assert_eq!(
            config.feed_urls().callback_url(),
            "https://hooks.example.com/callback"
        );
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/subscriptions.json"))
        );
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = ServiceConfig::from_toml("[renewal]\nmax_attempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_rejects_non_positive_lease() {
        assert!(ServiceConfig::from_toml("[hub]\nlease_seconds = 0").is_err());
    }

    #[test]
    fn test_rejects_lease_beyond_date_range() {
        let err = ServiceConfig::from_toml("[hub]\nlease_seconds = 100000000000000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let max = format!("[hub]\nlease_seconds = {}", MAX_LEASE_SECONDS);
        assert!(ServiceConfig::from_toml(&max).is_ok());
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        assert!(ServiceConfig::from_toml("[renewal]\nthreshold_hours = -1").is_err());
        assert!(ServiceConfig::from_toml("[renewal]\nthreshold_hours = 9223372036854775807").is_err());
        assert!(ServiceConfig::from_toml("[renewal]\nthreshold_hours = 0").is_ok());
    }
}
