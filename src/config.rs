//! Runtime configuration for the task board core.
//!
//! Settings come from TOML text, environment variables, or both: values in
//! the environment override values read from a file.
//!
//! ```toml
//! [database]
//! url = "postgres://tasklane@localhost/tasklane"
//! max_connections = 16
//!
//! [ordering]
//! reorder_policy = "partial"
//! ```

use crate::task::domain::ReorderPolicy;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the database URL.
pub const ENV_DATABASE_URL: &str = "TASKLANE_DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const ENV_DATABASE_MAX_CONNECTIONS: &str = "TASKLANE_DATABASE_MAX_CONNECTIONS";
/// Environment variable holding the connection checkout timeout in seconds.
pub const ENV_DATABASE_CONNECT_TIMEOUT_SECS: &str = "TASKLANE_DATABASE_CONNECT_TIMEOUT_SECS";
/// Environment variable holding the bulk reorder policy.
pub const ENV_REORDER_POLICY: &str = "TASKLANE_REORDER_POLICY";

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/tasklane";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Task ordering settings.
    pub ordering: OrderingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Task ordering settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderingConfig {
    /// How bulk reorders treat requests naming only some column tasks.
    pub reorder_policy: ReorderPolicy,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting holds a value of the wrong shape.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The database URL is blank.
    #[error("database url must not be empty")]
    EmptyDatabaseUrl,

    /// The connection pool would hold no connections.
    #[error("database max_connections must be at least 1")]
    ZeroMaxConnections,
}

impl BoardConfig {
    /// Parses configuration from TOML text. Missing settings take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is malformed or a value is
    /// invalid.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()
    }

    /// Builds configuration from defaults and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Overrides settings with any `TASKLANE_*` variables that are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is invalid.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overrides settings with values returned by `lookup` for each
    /// `TASKLANE_*` key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a looked-up value is invalid.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = url;
        }
        if let Some(raw) = lookup(ENV_DATABASE_MAX_CONNECTIONS) {
            self.database.max_connections = parse_number(ENV_DATABASE_MAX_CONNECTIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DATABASE_CONNECT_TIMEOUT_SECS) {
            self.database.connect_timeout_secs =
                parse_number(ENV_DATABASE_CONNECT_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_REORDER_POLICY) {
            self.ordering.reorder_policy =
                ReorderPolicy::try_from(raw.as_str()).map_err(|_| ConfigError::InvalidValue {
                    key: ENV_REORDER_POLICY,
                    value: raw.clone(),
                })?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ZeroMaxConnections);
        }
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
    })
}
