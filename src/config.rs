//! Connection configuration
//!
//! A Satellite connection is described in YAML:
//!
//! ```yaml
//! endpoint: https://satellite.example.com
//! username: admin
//! password: changeme
//! organisation: "1"
//! location: "2"
//! trace_level: debug
//! http:
//!   timeout_seconds: 30
//!   max_retries: 0
//!   rate_limit:
//!     requests_per_second: 10
//!     burst: 10
//! ```
//!
//! Every top-level scalar can be overridden from the environment
//! (`SATELLITE_ENDPOINT`, `SATELLITE_USERNAME`, ...).

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::resolver::AmbiguityPolicy;
use crate::types::{BackoffType, LogLevel, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "SATELLITE_";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Connection settings for a Satellite server
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SatelliteConfig {
    /// Server root URL; API paths (`/api/...`) are appended to it
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Organization id sent as `organization_id` on every request
    #[serde(default)]
    pub organisation: Option<String>,

    /// Location id sent as `location_id` on every request
    #[serde(default)]
    pub location: Option<String>,

    /// Log level for the command line tool
    #[serde(default)]
    pub trace_level: Option<LogLevel>,

    /// How host names that match several hosts are resolved
    #[serde(default)]
    pub host_name_policy: AmbiguityPolicy,

    #[serde(default)]
    pub http: HttpConfig,
}

impl fmt::Debug for SatelliteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SatelliteConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("organisation", &self.organisation)
            .field("location", &self.location)
            .field("trace_level", &self.trace_level)
            .field("host_name_policy", &self.host_name_policy)
            .field("http", &self.http)
            .finish()
    }
}

impl SatelliteConfig {
    /// Load a config file, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file without validating it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_yaml(&content)
    }

    /// Parse YAML without validating it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // an empty document is an empty config
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Override settings from `SATELLITE_*` variables looked up through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).none_if_empty();

        if let Some(v) = var("ENDPOINT") {
            self.endpoint = Some(v);
        }
        if let Some(v) = var("USERNAME") {
            self.username = Some(v);
        }
        if let Some(v) = var("PASSWORD") {
            self.password = Some(v);
        }
        if let Some(v) = var("ORGANISATION") {
            self.organisation = Some(v);
        }
        if let Some(v) = var("LOCATION") {
            self.location = Some(v);
        }
        if let Some(v) = var("TRACE_LEVEL") {
            match v.parse() {
                Ok(level) => self.trace_level = Some(level),
                Err(e) => tracing::warn!("ignoring {ENV_PREFIX}TRACE_LEVEL: {e}"),
            }
        }
    }

    /// Check that the connection can be established
    pub fn validate(&self) -> Result<()> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::config("no API endpoint available"))?;

        let url = url::Url::parse(endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.username.is_none() || self.password.is_none() {
            return Err(Error::auth("no authentication info available"));
        }

        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value("http.timeout_seconds", "must be positive"));
        }

        Ok(())
    }

    /// Basic auth credentials, if both are set
    pub fn auth(&self) -> AuthConfig {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => AuthConfig::basic(username, password),
            _ => AuthConfig::None,
        }
    }

    /// Transport settings derived from this config
    pub fn http_client_config(&self) -> Result<HttpClientConfig> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::config("no API endpoint available"))?;

        let backoff = &self.http.retry_backoff;
        let mut builder = HttpClientConfig::builder()
            .base_url(endpoint)
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                backoff.backoff_type,
                Duration::from_millis(backoff.initial_ms),
                Duration::from_millis(backoff.max_ms),
            );

        builder = if self.http.rate_limit.enabled {
            builder.rate_limit(RateLimiterConfig::new(
                self.http.rate_limit.requests_per_second,
                self.http.rate_limit.burst,
            ))
        } else {
            builder.no_rate_limit()
        };

        if let Some(org) = &self.organisation {
            builder = builder.query("organization_id", org);
        }
        if let Some(location) = &self.location {
            builder = builder.query("location_id", location);
        }

        Ok(builder.build())
    }

    /// Validate and build the HTTP client shared by all listings
    pub fn into_client(self) -> Result<HttpClient> {
        self.validate()?;
        HttpClient::with_auth(self.http_client_config()?, self.auth())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries for failed requests (0 disables retrying)
    #[serde(default)]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: 0,
            retry_backoff: BackoffConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests per second limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Requests allowed back to back
    #[serde(default = "default_rps")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: default_rps(),
            burst: default_rps(),
        }
    }
}

fn default_rps() -> u32 {
    10
}

fn default_true() -> bool {
    true
}
