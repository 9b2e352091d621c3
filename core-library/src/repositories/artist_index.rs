//! Artist index repository trait and implementation

use crate::codec::{field, Entity, FieldDescriptor};
use crate::error::Result;
use crate::models::ArtistIndex;
use crate::query::QueryOptions;
use crate::repositories::KvRepository;
use async_trait::async_trait;
use core_store::KvStore;
use std::sync::Arc;

impl Entity for ArtistIndex {
    const TABLE: &'static str = "index";

    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(ArtistIndex, "Id", id),
            field!(ArtistIndex, "Artists", artists),
        ]
    }
}

/// Artist index entries, one per index group
#[async_trait]
pub trait ArtistIndexRepository: Send + Sync {
    async fn count_all(&self) -> Result<i64>;

    /// Entry of one group
    ///
    /// # Errors
    /// Returns `LibraryError::NotFound` if the group has no entry
    async fn get(&self, id: &str) -> Result<ArtistIndex>;

    async fn put(&self, index: &ArtistIndex) -> Result<()>;

    /// Every entry, ordered by group name
    async fn get_all(&self) -> Result<Vec<ArtistIndex>>;

    /// Remove entries absent from `active`, returning removed group names
    async fn purge_inactive(&self, active: &[ArtistIndex]) -> Result<Vec<String>>;
}

/// Key-value store implementation of ArtistIndexRepository
#[derive(Clone)]
pub struct KvArtistIndexRepository {
    inner: KvRepository<ArtistIndex>,
}

impl KvArtistIndexRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Result<Self> {
        Ok(Self {
            inner: KvRepository::new(store)?,
        })
    }
}

#[async_trait]
impl ArtistIndexRepository for KvArtistIndexRepository {
    async fn count_all(&self) -> Result<i64> {
        self.inner.count_all().await
    }

    async fn get(&self, id: &str) -> Result<ArtistIndex> {
        self.inner.get(id).await
    }

    async fn put(&self, index: &ArtistIndex) -> Result<()> {
        self.inner.put(index).await
    }

    async fn get_all(&self) -> Result<Vec<ArtistIndex>> {
        self.inner
            .load_all(&QueryOptions::sorted_by("Id").with_alpha(true))
            .await
    }

    async fn purge_inactive(&self, active: &[ArtistIndex]) -> Result<Vec<String>> {
        self.inner.purge_inactive(active).await
    }
}
