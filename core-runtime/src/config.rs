//! # Core Configuration Module
//!
//! Provides configuration management for the catalog runtime.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the settings needed to open the catalog store and set up
//! logging. It enforces fail-fast validation so a misconfigured process stops
//! before touching the database.
//!
//! ## Usage
//!
//! ```no_run
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/catalog/catalog.db")
//!     .max_connections(8)
//!     .acquire_timeout(Duration::from_secs(10))
//!     .build()
//!     .expect("Failed to build config");
//!
//! let store_config = config.store_config();
//! ```
//!
//! ## Error Handling
//!
//! The builder validates required settings and returns actionable errors:
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // This will panic: no database path was given
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing database path");
//! ```

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use core_store::StoreConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default maximum number of pooled store connections
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time to wait for a pooled connection
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration for the catalog runtime.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Path to the SQLite database file backing the store
    pub database_path: PathBuf,

    /// Maximum number of pooled store connections
    pub max_connections: u32,

    /// Maximum time to wait for a pooled connection
    pub acquire_timeout: Duration,

    /// Logging setup
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Database path is not empty
    /// - At least one connection is allowed
    /// - Acquire timeout is not zero
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "Max connections must be at least 1. Use .max_connections() to raise it."
                    .to_string(),
            ));
        }

        if self.acquire_timeout.is_zero() {
            return Err(Error::Config(
                "Acquire timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Store settings derived from this configuration
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Builder for [`CoreConfig`]
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    max_connections: Option<u32>,
    acquire_timeout: Option<Duration>,
    logging: Option<LoggingConfig>,
}

impl CoreConfigBuilder {
    /// Sets the database file path (required).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().database_path("catalog.db");
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the maximum number of pooled connections (default: 5).
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Sets how long to wait for a pooled connection (default: 30s).
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Sets the logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the database path is missing or any
    /// setting fails [`CoreConfig::validate`].
    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let config = CoreConfig {
            database_path,
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: self.acquire_timeout.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT),
            logging: self.logging.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[test]
    fn test_builder_requires_database_path() {
        let result = CoreConfig::builder().build();
        match result {
            Err(Error::Config(message)) => assert!(message.contains("database_path")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfig::builder()
            .database_path("/tmp/catalog.db")
            .build()
            .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.acquire_timeout, DEFAULT_ACQUIRE_TIMEOUT);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = CoreConfig::builder()
            .database_path(PathBuf::from("/data/catalog.db"))
            .max_connections(12)
            .acquire_timeout(Duration::from_secs(3))
            .logging(LoggingConfig::default().with_level(LogLevel::Debug))
            .build()
            .unwrap();

        assert_eq!(config.max_connections, 12);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let result = CoreConfig::builder().database_path("").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let result = CoreConfig::builder()
            .database_path("catalog.db")
            .max_connections(0)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let result = CoreConfig::builder()
            .database_path("catalog.db")
            .acquire_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_store_config() {
        let config = CoreConfig::builder()
            .database_path("/data/catalog.db")
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let store_config = config.store_config();
        assert_eq!(store_config.database_url, "sqlite:/data/catalog.db");
        assert_eq!(store_config.max_connections, 8);
        assert_eq!(store_config.acquire_timeout, Duration::from_secs(5));
        assert!(!store_config.is_in_memory());
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = CoreConfig::builder()
            .database_path("catalog.db")
            .build()
            .unwrap();
        assert_eq!(config.clone(), config);
    }
}
