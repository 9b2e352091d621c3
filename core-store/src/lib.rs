//! # Key-Value Store Module
//!
//! The storage engine underneath the catalog repositories. Its only primitives
//! are scalar key/value pairs and sorted sets (member → integer score), which
//! is all the repository layer needs to offer lookup by id, ordered listing,
//! secondary-index range queries and parent/child enumeration.
//!
//! ## Overview
//!
//! - [`KvStore`] is the engine contract. Every repository talks to the engine
//!   exclusively through an `Arc<dyn KvStore>`.
//! - [`SqliteKvStore`] is the embedded implementation: a SQLite file opened
//!   through a `sqlx` pool, holding a `kv` table for scalars and a `zset`
//!   table for sorted sets.
//! - [`SortedJoin`] describes the "join" read used to list records sorted by
//!   an arbitrary field on top of a sorted-set-only engine.
//!
//! Missing keys and members are ordinary `None` results. Only engine faults
//! produce a [`StoreError`].

pub mod config;
pub mod error;
mod join;
pub mod sqlite;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use sqlite::SqliteKvStore;

use async_trait::async_trait;

/// Score attached to a sorted-set member.
pub type Score = i64;

/// A sorted-set member together with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePair {
    pub score: Score,
    pub member: String,
}

impl ScorePair {
    pub fn new(score: Score, member: impl Into<String>) -> Self {
        Self {
            score,
            member: member.into(),
        }
    }
}

/// Request for [`KvStore::sorted_join`].
///
/// Patterns contain a single `*` placeholder that is replaced by each member
/// of the driving set, e.g. `album:*:Name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedJoin {
    /// Sorted set whose members drive the join
    pub set_key: String,
    /// Restrict the driving members to this inclusive score range
    pub score_range: Option<(Score, Score)>,
    /// Number of members to skip after ordering
    pub offset: usize,
    /// Maximum number of members to return (`None` = unbounded)
    pub limit: Option<usize>,
    /// Key pattern whose value orders the members (`None` = set order)
    pub sort_by: Option<String>,
    /// Key patterns fetched for every selected member
    pub fields: Vec<String>,
    /// Compare sort values as text instead of numerically
    pub alpha: bool,
    /// Reverse the final order
    pub descending: bool,
}

impl SortedJoin {
    pub fn new(set_key: impl Into<String>) -> Self {
        Self {
            set_key: set_key.into(),
            ..Self::default()
        }
    }
}

/// Replace the `*` placeholder of `pattern` with `member`.
pub fn expand_pattern(pattern: &str, member: &str) -> String {
    pattern.replacen('*', member, 1)
}

/// Key-value and sorted-set engine contract.
///
/// Implementations serialise individual operations but provide no atomicity
/// across keys.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read one scalar key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Read many scalar keys in one round trip, preserving `keys` order.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Write one scalar key, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete scalar keys, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Insert `member` into `set_key` or update its score.
    async fn zadd(&self, set_key: &str, score: Score, member: &str) -> Result<()>;

    /// Remove members from a sorted set, returning how many were present.
    async fn zrem(&self, set_key: &str, members: &[String]) -> Result<u64>;

    /// Number of members in a sorted set.
    async fn zcard(&self, set_key: &str) -> Result<i64>;

    /// Score of `member`, or `None` when it is not in the set.
    async fn zscore(&self, set_key: &str, member: &str) -> Result<Option<Score>>;

    /// Every member of a sorted set in native order (score, then member).
    async fn zrange(&self, set_key: &str) -> Result<Vec<ScorePair>>;

    /// Members whose score lies in `[min, max]`, after skipping `offset` and
    /// keeping at most `limit`. `descending` walks the set backwards.
    async fn zrange_by_score(
        &self,
        set_key: &str,
        min: Score,
        max: Score,
        offset: usize,
        limit: Option<usize>,
        descending: bool,
    ) -> Result<Vec<ScorePair>>;

    /// Sorted join read.
    ///
    /// Orders the members of the driving set (by the value stored under
    /// `sort_by`, or by score when absent), applies direction, offset and
    /// limit, then returns the values of every `fields` pattern for each
    /// selected member, concatenated member by member. Without field patterns
    /// the member names themselves are returned.
    ///
    /// Sort values holding a JSON string are compared by their content.
    /// Numeric sorts read JSON booleans as 0/1 and RFC 3339 timestamps as
    /// epoch milliseconds; any other non-numeric value is
    /// [`StoreError::NonNumericSortValue`].
    async fn sorted_join(&self, request: &SortedJoin) -> Result<Vec<Option<Vec<u8>>>>;

    /// Remove every key and sorted set.
    async fn flush_all(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_pattern() {
        assert_eq!(expand_pattern("album:*:Name", "a1"), "album:a1:Name");
        assert_eq!(expand_pattern("no-placeholder", "a1"), "no-placeholder");
    }

    #[test]
    fn test_expand_pattern_replaces_first_placeholder_only() {
        assert_eq!(expand_pattern("x:*:*", "m"), "x:m:*");
    }

    #[test]
    fn test_sorted_join_new() {
        let request = SortedJoin::new("playlists:all");
        assert_eq!(request.set_key, "playlists:all");
        assert_eq!(request.offset, 0);
        assert!(request.limit.is_none());
        assert!(request.sort_by.is_none());
        assert!(!request.alpha);
    }
}
