//! # Generic Key-Value Repository
//!
//! [`KvRepository`] implements CRUD, listing, range queries and purge for any
//! [`Entity`] on top of a [`KvStore`]. Concrete repositories wrap it and add
//! typed, entity-specific queries.
//!
//! ## Consistency
//!
//! A `put` is a series of independent writes (fields, index entries, all-set,
//! child collection). Concurrent readers may observe a record between those
//! writes, so listings skip members whose fields are missing or do not decode
//! instead of failing the whole query.

use crate::codec::{Entity, EntityCodec, ParentRelation, ScalarValue};
use crate::error::{LibraryError, Result};
use crate::keys;
use crate::query::QueryOptions;
use core_store::{KvStore, Score, SortedJoin};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Repository for one entity type stored in a [`KvStore`]
pub struct KvRepository<E: Entity> {
    store: Arc<dyn KvStore>,
    codec: Arc<EntityCodec<E>>,
}

impl<E: Entity> Clone for KvRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<E: Entity> KvRepository<E> {
    /// Create a repository for `E`, validating its descriptor
    pub fn new(store: Arc<dyn KvStore>) -> Result<Self> {
        Ok(Self {
            store,
            codec: Arc::new(EntityCodec::new()?),
        })
    }

    pub fn codec(&self) -> &EntityCodec<E> {
        &self.codec
    }

    /// Number of records in the table
    pub async fn count_all(&self) -> Result<i64> {
        Ok(self.store.zcard(&keys::all_key(E::TABLE)).await?)
    }

    /// Whether a record with `id` is present
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let score = self.store.zscore(&keys::all_key(E::TABLE), id).await?;
        Ok(score.is_some())
    }

    /// Store `entity`, overwriting every field and refreshing every index
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::InvalidInput` if the id is empty, or the first
    /// store failure. Writes issued before a failure are not rolled back.
    pub async fn put(&self, entity: &E) -> Result<()> {
        let id = entity.id();
        if id.is_empty() {
            return Err(LibraryError::invalid_input(
                "Id",
                format!("{} id is not set", E::TABLE),
            ));
        }

        let parent_id = self.codec.parent_id(entity);
        if let Some(parent) = self.codec.parent() {
            self.detach_from_previous_parent(parent, id, parent_id)
                .await?;
        }

        for (field, value) in self.codec.encode(entity)? {
            self.store
                .set(&keys::field_key(E::TABLE, id, field), &value)
                .await?;
        }

        for index in self.codec.indexes() {
            let score = (index.project)(entity).score();
            self.store
                .zadd(&keys::index_key(E::TABLE, index.name), score, id)
                .await?;
        }

        self.store.zadd(&keys::all_key(E::TABLE), 0, id).await?;

        if let Some(parent) = self.codec.parent() {
            if !parent_id.is_empty() {
                self.store
                    .zadd(&keys::children_key(parent.table, parent_id, E::TABLE), 0, id)
                    .await?;
            }
        }

        debug!(table = E::TABLE, id, "Stored record");
        Ok(())
    }

    /// Read the record with `id`
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` when the primary field is absent and
    /// `LibraryError::Decode` when a stored value is malformed.
    pub async fn get(&self, id: &str) -> Result<E> {
        let values = self.store.mget(&self.field_keys(id)).await?;
        if !is_present(&values) {
            return Err(LibraryError::not_found(E::TABLE, id));
        }
        self.codec.decode(&values)
    }

    /// List every record
    pub async fn load_all(&self, options: &QueryOptions) -> Result<Vec<E>> {
        self.load_from_set(keys::all_key(E::TABLE), None, options)
            .await
    }

    /// List the records whose parent in `parent_table` is `parent_id`
    pub async fn load_children(
        &self,
        parent_table: &str,
        parent_id: &str,
        options: &QueryOptions,
    ) -> Result<Vec<E>> {
        self.load_from_set(
            keys::children_key(parent_table, parent_id, E::TABLE),
            None,
            options,
        )
        .await
    }

    /// List the records whose `index_name` score lies in `[min, max]`
    ///
    /// Records come back in index order unless `options.sort_by` names a
    /// field to order by.
    pub async fn load_range(
        &self,
        index_name: &str,
        min: ScalarValue,
        max: ScalarValue,
        options: &QueryOptions,
    ) -> Result<Vec<E>> {
        let index = self.codec.index(index_name).ok_or_else(|| {
            LibraryError::invalid_input(
                "index",
                format!("{} has no index named {}", E::TABLE, index_name),
            )
        })?;
        let set_key = keys::index_key(E::TABLE, index.name);
        let (min, max) = (min.score(), max.score());

        if !options.sort_by.is_empty() {
            return self.load_from_set(set_key, Some((min, max)), options).await;
        }

        let pairs = self
            .store
            .zrange_by_score(
                &set_key,
                min,
                max,
                options.offset,
                options.limit(),
                options.descending,
            )
            .await?;

        let mut entities = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match self.get(&pair.member).await {
                Ok(entity) => entities.push(entity),
                Err(LibraryError::NotFound { .. }) => {
                    debug!(table = E::TABLE, id = %pair.member, "Skipping dangling index entry");
                }
                Err(error @ LibraryError::Decode { .. }) => {
                    warn!(table = E::TABLE, id = %pair.member, error = %error, "Skipping undecodable record");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(entities)
    }

    /// Remove every stored record whose id is not in `active`
    ///
    /// `active` must be the complete, authoritative set of records. Returns
    /// the removed ids.
    ///
    /// # Errors
    ///
    /// A failure part-way returns `LibraryError::Purge` carrying the ids
    /// removed before it.
    pub async fn purge_inactive(&self, active: &[E]) -> Result<Vec<String>> {
        let active_ids: HashSet<&str> = active.iter().map(Entity::id).collect();

        let inactive: Vec<String> = self
            .store
            .zrange(&keys::all_key(E::TABLE))
            .await?
            .into_iter()
            .map(|pair| pair.member)
            .filter(|id| !active_ids.contains(id.as_str()))
            .collect();

        let removed = self.remove(&inactive).await?;
        if !removed.is_empty() {
            info!(
                table = E::TABLE,
                removed = removed.len(),
                "Purged inactive records"
            );
        }
        Ok(removed)
    }

    /// Remove the records with `ids`, returning those that were present
    ///
    /// # Errors
    ///
    /// Same as [`purge_inactive`](Self::purge_inactive).
    pub async fn remove(&self, ids: &[String]) -> Result<Vec<String>> {
        let mut removed = Vec::with_capacity(ids.len());

        for id in ids {
            match self.remove_one(id).await {
                Ok(true) => removed.push(id.clone()),
                Ok(false) => {}
                Err(source) => {
                    warn!(
                        table = E::TABLE,
                        id = %id,
                        removed = removed.len(),
                        error = %source,
                        "Removal aborted"
                    );
                    return Err(LibraryError::Purge {
                        table: E::TABLE.to_string(),
                        removed,
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(removed)
    }

    async fn remove_one(&self, id: &str) -> Result<bool> {
        let member = [id.to_string()];

        if let Some(parent) = self.codec.parent() {
            if let Some(parent_id) = self.stored_parent_id(parent, id).await? {
                self.store
                    .zrem(
                        &keys::children_key(parent.table, &parent_id, E::TABLE),
                        &member,
                    )
                    .await?;
            }
        }

        for index in self.codec.indexes() {
            self.store
                .zrem(&keys::index_key(E::TABLE, index.name), &member)
                .await?;
        }

        self.store.delete(&self.field_keys(id)).await?;
        let removed = self.store.zrem(&keys::all_key(E::TABLE), &member).await?;

        debug!(table = E::TABLE, id, "Removed record");
        Ok(removed > 0)
    }

    async fn detach_from_previous_parent(
        &self,
        parent: &ParentRelation<E>,
        id: &str,
        parent_id: &str,
    ) -> Result<()> {
        if let Some(previous) = self.stored_parent_id(parent, id).await? {
            if previous != parent_id {
                self.store
                    .zrem(
                        &keys::children_key(parent.table, &previous, E::TABLE),
                        &[id.to_string()],
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn stored_parent_id(
        &self,
        parent: &ParentRelation<E>,
        id: &str,
    ) -> Result<Option<String>> {
        let raw = self
            .store
            .get(&keys::field_key(E::TABLE, id, parent.field))
            .await?;

        match raw {
            Some(bytes) if !bytes.is_empty() => {
                let parent_id: Option<String> =
                    serde_json::from_slice(&bytes).map_err(|source| LibraryError::Decode {
                        table: E::TABLE.to_string(),
                        field: parent.field.to_string(),
                        source,
                    })?;
                Ok(parent_id.filter(|parent_id| !parent_id.is_empty()))
            }
            _ => Ok(None),
        }
    }

    async fn load_from_set(
        &self,
        set_key: String,
        score_range: Option<(Score, Score)>,
        options: &QueryOptions,
    ) -> Result<Vec<E>> {
        let request = SortedJoin {
            set_key,
            score_range,
            offset: options.offset,
            limit: options.limit(),
            sort_by: self.sort_pattern(options)?,
            fields: self.field_keys("*"),
            alpha: options.alpha,
            descending: options.descending,
        };

        let response = self.store.sorted_join(&request).await?;
        Ok(self.decode_rows(&response))
    }

    fn sort_pattern(&self, options: &QueryOptions) -> Result<Option<String>> {
        if options.sort_by.is_empty() {
            return Ok(None);
        }
        if !self.codec.has_field(&options.sort_by) {
            return Err(LibraryError::invalid_input(
                "sort_by",
                format!("{} has no field {}", E::TABLE, options.sort_by),
            ));
        }
        Ok(Some(keys::field_key(E::TABLE, "*", &options.sort_by)))
    }

    fn decode_rows(&self, response: &[Option<Vec<u8>>]) -> Vec<E> {
        response
            .chunks(self.codec.field_count())
            .filter_map(|values| {
                if !is_present(values) {
                    debug!(table = E::TABLE, "Skipping member without stored fields");
                    return None;
                }
                match self.codec.decode(values) {
                    Ok(entity) => Some(entity),
                    Err(error) => {
                        warn!(table = E::TABLE, error = %error, "Skipping undecodable record");
                        None
                    }
                }
            })
            .collect()
    }

    fn field_keys(&self, id: &str) -> Vec<String> {
        self.codec
            .field_names()
            .map(|field| keys::field_key(E::TABLE, id, field))
            .collect()
    }
}

/// A record exists when its primary (first) field is stored
fn is_present(values: &[Option<Vec<u8>>]) -> bool {
    values
        .first()
        .and_then(Option::as_ref)
        .is_some_and(|value| !value.is_empty())
}
