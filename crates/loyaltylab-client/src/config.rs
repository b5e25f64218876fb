//! Client configuration: hard defaults, environment credentials and overrides
//!
//! [`ClientConfig::defaults`] reads `LOYALTY_LAB_SDK_USERNAME` and
//! `LOYALTY_LAB_SDK_PASSWORD` once per process. Callers layer
//! [`ConfigOverrides`] on top with [`ClientConfig::merge`]; each client keeps
//! its own merged snapshot.

use crate::transport::TimeoutConfig;
use loyaltylab_core::SANITIZED_PLACEHOLDER;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.loyaltylab.com/loyaltyapi/loyaltyapi.asmx";
pub const DEFAULT_NAMESPACE: &str = "http://www.loyaltylab.com/loyaltyapi/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_RETRIES: u32 = 2;

pub const USERNAME_ENV: &str = "LOYALTY_LAB_SDK_USERNAME";
pub const PASSWORD_ENV: &str = "LOYALTY_LAB_SDK_PASSWORD";

static ENV_DEFAULTS: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file '{path}': {message}")]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Immutable per-client configuration snapshot.
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub open_timeout: Duration,
    pub read_timeout: Duration,
    pub connection_error_retries: u32,
    pub lazy_authentication: bool,
    pub endpoint: String,
    pub namespace: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            open_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            connection_error_retries: DEFAULT_RETRIES,
            lazy_authentication: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| SANITIZED_PLACEHOLDER))
            .field("open_timeout", &self.open_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("connection_error_retries", &self.connection_error_retries)
            .field("lazy_authentication", &self.lazy_authentication)
            .field("endpoint", &self.endpoint)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl ClientConfig {
    /// Process-wide defaults, environment credentials included.
    pub fn defaults() -> Self {
        ENV_DEFAULTS.clone()
    }

    /// Hard defaults plus credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Hard defaults plus credentials from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            username: lookup(USERNAME_ENV),
            password: lookup(PASSWORD_ENV),
            ..Self::default()
        }
    }

    /// Layer overrides on top of this configuration. Unset fields are kept.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(username) = overrides.username {
            self.username = Some(username);
        }
        if let Some(password) = overrides.password {
            self.password = Some(password);
        }
        if let Some(open_timeout) = overrides.open_timeout {
            self.open_timeout = open_timeout;
        }
        if let Some(read_timeout) = overrides.read_timeout {
            self.read_timeout = read_timeout;
        }
        if let Some(retries) = overrides.connection_error_retries {
            self.connection_error_retries = retries;
        }
        if let Some(lazy) = overrides.lazy_authentication {
            self.lazy_authentication = lazy;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(namespace) = overrides.namespace {
            self.namespace = namespace;
        }
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_lazy_authentication(mut self, lazy: bool) -> Self {
        self.lazy_authentication = lazy;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.connection_error_retries = retries;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig {
            open: self.open_timeout,
            read: self.read_timeout,
        }
    }
}

/// Partial configuration; every field is optional.
///
/// Timeouts are given in (fractional) seconds when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(deserialize_with = "deserialize_secs")]
    pub open_timeout: Option<Duration>,
    #[serde(deserialize_with = "deserialize_secs")]
    pub read_timeout: Option<Duration>,
    pub connection_error_retries: Option<u32>,
    pub lazy_authentication: Option<bool>,
    pub endpoint: Option<String>,
    pub namespace: Option<String>,
}

impl ConfigOverrides {
    /// Load overrides from a JSON or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_str_content(&content).map_err(|message| ConfigError::Parse {
            path: display,
            message,
        })
    }

    fn from_str_content(content: &str) -> Result<Self, String> {
        // Try to parse as JSON first, then YAML
        if let Ok(overrides) = serde_json::from_str::<Self>(content) {
            return Ok(overrides);
        }
        serde_yaml::from_str::<Self>(content).map_err(|e| e.to_string())
    }
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(deserializer)?;
    secs.map(|s| Duration::try_from_secs_f64(s).map_err(serde::de::Error::custom))
        .transpose()
}
