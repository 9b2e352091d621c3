//! # Embedded SQLite Engine
//!
//! Implements [`KvStore`] on a SQLite file opened through a `sqlx` pool.
//!
//! ## Layout
//!
//! - `kv(key, value)` holds scalar keys
//! - `zset(set_key, member, score)` holds sorted-set members, with an index on
//!   `(set_key, score, member)` so range scans follow native set order
//!
//! Files are opened in WAL mode so readers proceed alongside the writer. The
//! schema is migrated and a connection checked before [`SqliteKvStore::open`]
//! returns.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::{expand_pattern, join, KvStore, Score, ScorePair, SortedJoin};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Upper bound on bound parameters per statement; batches are split above it.
const MAX_BATCH_KEYS: usize = 500;

/// SQLite implementation of [`KvStore`]
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: Pool<Sqlite>,
    config: StoreConfig,
}

impl SqliteKvStore {
    /// Open (creating if missing) the store described by `config`
    ///
    /// # Errors
    ///
    /// `StoreError::Database` when the file cannot be opened or the health
    /// check fails, `StoreError::Migration` when the schema cannot be applied.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        info!(
            database_url = %config.database_url,
            pool_size = config.pool_size(),
            "Opening key-value store"
        );

        let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true)
            // 64MB page cache
            .pragma("cache_size", "-64000")
            // 256MB memory-mapped I/O
            .pragma("mmap_size", "268435456");

        let mut pool_options = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(config.pool_size())
            .acquire_timeout(config.acquire_timeout);
        if config.is_in_memory() {
            // The database is dropped with its only connection
            pool_options = pool_options.max_lifetime(None).idle_timeout(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create connection pool");
                StoreError::Database(e)
            })?;

        let store = Self { pool, config };
        store.run_migrations().await?;
        store.health_check().await?;

        info!(connections = store.pool.size(), "Key-value store ready");
        Ok(store)
    }

    /// Open a fresh in-memory store
    ///
    /// ```rust,ignore
    /// #[tokio::test]
    /// async fn test_something() {
    ///     let store = SqliteKvStore::in_memory().await.unwrap();
    /// }
    /// ```
    pub async fn in_memory() -> Result<Self> {
        Self::open(StoreConfig::in_memory()).await
    }

    /// Configuration the store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Close every pooled connection. Later operations fail with a
    /// `StoreError`.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Key-value store closed");
    }

    async fn run_migrations(&self) -> Result<()> {
        debug!("Running store migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Migration failed");
                StoreError::Migration(e.to_string())
            })
    }

    async fn health_check(&self) -> Result<()> {
        let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        debug!(result = one, "Store health check passed");
        Ok(())
    }
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let mut found: HashMap<String, Vec<u8>> = HashMap::with_capacity(keys.len());

        for chunk in keys.chunks(MAX_BATCH_KEYS) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT key, value FROM kv WHERE key IN (");
            let mut separated = builder.separated(", ");
            for key in chunk {
                separated.push_bind(key.as_str());
            }
            separated.push_unseparated(")");

            let rows: Vec<(String, Vec<u8>)> =
                builder.build_query_as().fetch_all(&self.pool).await?;
            found.extend(rows);
        }

        Ok(keys.iter().map(|key| found.get(key).cloned()).collect())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        let mut removed = 0;

        for chunk in keys.chunks(MAX_BATCH_KEYS) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM kv WHERE key IN (");
            let mut separated = builder.separated(", ");
            for key in chunk {
                separated.push_bind(key.as_str());
            }
            separated.push_unseparated(")");

            removed += builder.build().execute(&self.pool).await?.rows_affected();
        }

        Ok(removed)
    }

    async fn zadd(&self, set_key: &str, score: Score, member: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO zset (set_key, member, score) VALUES (?, ?, ?) \
             ON CONFLICT(set_key, member) DO UPDATE SET score = excluded.score",
        )
        .bind(set_key)
        .bind(member)
        .bind(score)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn zrem(&self, set_key: &str, members: &[String]) -> Result<u64> {
        let mut removed = 0;

        for chunk in members.chunks(MAX_BATCH_KEYS) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM zset WHERE set_key = ");
            builder.push_bind(set_key);
            builder.push(" AND member IN (");
            let mut separated = builder.separated(", ");
            for member in chunk {
                separated.push_bind(member.as_str());
            }
            separated.push_unseparated(")");

            removed += builder.build().execute(&self.pool).await?.rows_affected();
        }

        Ok(removed)
    }

    async fn zcard(&self, set_key: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM zset WHERE set_key = ?")
            .bind(set_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn zscore(&self, set_key: &str, member: &str) -> Result<Option<Score>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT score FROM zset WHERE set_key = ? AND member = ?")
                .bind(set_key)
                .bind(member)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(score,)| score))
    }

    async fn zrange(&self, set_key: &str) -> Result<Vec<ScorePair>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT member, score FROM zset WHERE set_key = ? ORDER BY score ASC, member ASC",
        )
        .bind(set_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(member, score)| ScorePair { score, member })
            .collect())
    }

    async fn zrange_by_score(
        &self,
        set_key: &str,
        min: Score,
        max: Score,
        offset: usize,
        limit: Option<usize>,
        descending: bool,
    ) -> Result<Vec<ScorePair>> {
        let sql = if descending {
            "SELECT member, score FROM zset \
             WHERE set_key = ? AND score BETWEEN ? AND ? \
             ORDER BY score DESC, member DESC LIMIT ? OFFSET ?"
        } else {
            "SELECT member, score FROM zset \
             WHERE set_key = ? AND score BETWEEN ? AND ? \
             ORDER BY score ASC, member ASC LIMIT ? OFFSET ?"
        };

        // LIMIT -1 is unbounded in SQLite
        let limit = limit.map(to_sql_count).unwrap_or(-1);

        let rows: Vec<(String, i64)> = sqlx::query_as(sql)
            .bind(set_key)
            .bind(min)
            .bind(max)
            .bind(limit)
            .bind(to_sql_count(offset))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(member, score)| ScorePair { score, member })
            .collect())
    }

    async fn sorted_join(&self, request: &SortedJoin) -> Result<Vec<Option<Vec<u8>>>> {
        let pairs = match request.score_range {
            Some((min, max)) => {
                self.zrange_by_score(&request.set_key, min, max, 0, None, false)
                    .await?
            }
            None => self.zrange(&request.set_key).await?,
        };
        let mut members: Vec<String> = pairs.into_iter().map(|pair| pair.member).collect();

        if let Some(pattern) = &request.sort_by {
            let sort_keys: Vec<String> = members
                .iter()
                .map(|member| expand_pattern(pattern, member))
                .collect();
            let sort_values = self.mget(&sort_keys).await?;
            members = join::sort_by_values(members, sort_values, pattern, request.alpha)?;
        }

        let selected = join::window(
            members,
            request.descending,
            request.offset,
            request.limit,
        );

        debug!(
            set_key = %request.set_key,
            selected = selected.len(),
            fields = request.fields.len(),
            "Sorted join"
        );

        if request.fields.is_empty() {
            return Ok(selected
                .into_iter()
                .map(|member| Some(member.into_bytes()))
                .collect());
        }

        let keys: Vec<String> = selected
            .iter()
            .flat_map(|member| {
                request
                    .fields
                    .iter()
                    .map(move |pattern| expand_pattern(pattern, member))
            })
            .collect();

        self.mget(&keys).await
    }

    async fn flush_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM kv").execute(&self.pool).await?;
        sqlx::query("DELETE FROM zset").execute(&self.pool).await?;
        info!("Key-value store flushed");
        Ok(())
    }
}
