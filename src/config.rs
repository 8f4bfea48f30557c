//! Client and API settings
//!
//! Immutable value objects constructed once and passed explicitly through
//! the session, retry and fetch chain. They can be built in code with
//! [`ApiSettings::builder`] or loaded from YAML/JSON files.

use crate::error::{Error, Result, ResultExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Client Settings
// ============================================================================

/// Settings shared across a client instance's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Maximum number of attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout (seconds in settings files)
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// Client name used in log output
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_name() -> String {
    "unnamed_client".to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout: default_timeout(),
            name: default_name(),
        }
    }
}

// ============================================================================
// API Settings
// ============================================================================

/// Configuration for one logical API target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Client-wide settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Base URL, e.g. `https://api.worldbank.org/v2`
    #[serde(default)]
    pub base_url: String,

    /// Default endpoint used when a request names none
    #[serde(default)]
    pub endpoint: String,

    /// Records requested per page
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Static headers applied to every request
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,

    /// Bearer token for the `Authorization` header
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_batch_size() -> u32 {
    1000
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            base_url: String::new(),
            endpoint: String::new(),
            batch_size: default_batch_size(),
            headers: None,
            auth_token: None,
        }
    }
}

impl ApiSettings {
    /// Create a new settings builder
    pub fn builder() -> ApiSettingsBuilder {
        ApiSettingsBuilder::default()
    }

    /// Check that the settings describe a reachable target
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(&self.base_url)?;
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be greater than zero"));
        }
        if self.client.max_retries == 0 {
            return Err(Error::config("max_retries must be at least 1"));
        }
        Ok(())
    }

    /// Join the base URL and an endpoint, stripping leading `/` from the endpoint
    pub fn url_for(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        format!("{base}/{endpoint}")
    }
}

/// Builder for API settings
#[derive(Default)]
pub struct ApiSettingsBuilder {
    settings: ApiSettings,
}

impl ApiSettingsBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.base_url = url.into();
        self
    }

    /// Set the default endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.endpoint = endpoint.into();
        self
    }

    /// Set the page size
    pub fn batch_size(mut self, size: u32) -> Self {
        self.settings.batch_size = size;
        self
    }

    /// Add a static header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings
            .headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the bearer token
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.settings.auth_token = Some(token.into());
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.client.timeout = timeout;
        self
    }

    /// Set the maximum attempts per request
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.settings.client.max_retries = retries;
        self
    }

    /// Set the client name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.settings.client.name = name.into();
        self
    }

    /// Build the settings
    pub fn build(self) -> ApiSettings {
        self.settings
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load settings from a YAML or JSON file, chosen by extension
pub fn load_settings<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("yaml" | "yml") | None => Ok(serde_yaml::from_str(&content)?),
        Some(other) => Err(Error::config(format!(
            "Unsupported settings file extension: {other}"
        ))),
    }
}

/// Serde helpers for durations expressed in seconds
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("timeout must be a non-negative number"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}
