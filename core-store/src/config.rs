//! Where the store lives and how its connection pool is sized

use std::path::PathBuf;
use std::time::Duration;

/// In-memory SQLite URL; each connection to it is a separate database
const MEMORY_URL: &str = "sqlite::memory:";

/// Settings for [`SqliteKvStore::open`](crate::SqliteKvStore::open)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `sqlite:` URL of the database file, or the in-memory URL
    pub database_url: String,

    /// Pool size; an in-memory store always uses one connection
    pub max_connections: u32,

    /// How long an operation waits for a pooled connection
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    /// Store backed by the file at `database_path`, created when missing
    ///
    /// # Examples
    ///
    /// ```
    /// use core_store::StoreConfig;
    ///
    /// let config = StoreConfig::new("/var/lib/sonic/catalog.db");
    /// assert_eq!(config.database_url, "sqlite:/var/lib/sonic/catalog.db");
    /// ```
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_url: format!("sqlite:{}", database_path.into().display()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// Throwaway store living as long as the process keeps it open
    pub fn in_memory() -> Self {
        Self {
            database_url: MEMORY_URL.to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }

    /// Pool size actually used when opening
    pub fn pool_size(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_file_url() {
        let config = StoreConfig::new("catalog.db");
        assert_eq!(config.database_url, "sqlite:catalog.db");
        assert_eq!(config.pool_size(), 5);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_in_memory_pins_one_connection() {
        let config = StoreConfig::in_memory().max_connections(8);
        assert!(config.is_in_memory());
        assert_eq!(config.pool_size(), 1);
    }

    #[test]
    fn test_setters() {
        let config = StoreConfig::new("catalog.db")
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(5));

        assert_eq!(config.pool_size(), 8);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(StoreConfig::new("catalog.db").max_connections(0).pool_size(), 1);
    }
}
