//! Artist repository trait and implementation

use crate::codec::{field, Entity, FieldDescriptor};
use crate::error::Result;
use crate::models::Artist;
use crate::query::QueryOptions;
use crate::repositories::KvRepository;
use async_trait::async_trait;
use core_store::KvStore;
use std::sync::Arc;

impl Entity for Artist {
    const TABLE: &'static str = "artist";

    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(Artist, "Id", id),
            field!(Artist, "Name", name),
            field!(Artist, "AlbumCount", album_count),
        ]
    }
}

/// Artist repository interface for data access operations
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Count all artists
    async fn count_all(&self) -> Result<i64>;

    /// Check whether an artist exists
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Find an artist by its ID
    ///
    /// # Errors
    /// Returns `LibraryError::NotFound` if no artist has this ID
    async fn get(&self, id: &str) -> Result<Artist>;

    /// Insert or fully overwrite an artist
    async fn put(&self, artist: &Artist) -> Result<()>;

    /// List artists, by name unless `options` says otherwise
    async fn get_all(&self, options: &QueryOptions) -> Result<Vec<Artist>>;

    /// Remove artists absent from `active`, returning removed IDs
    async fn purge_inactive(&self, active: &[Artist]) -> Result<Vec<String>>;

    /// Remove artists by ID, returning those that existed
    async fn remove(&self, ids: &[String]) -> Result<Vec<String>>;
}

/// Key-value store implementation of ArtistRepository
#[derive(Clone)]
pub struct KvArtistRepository {
    inner: KvRepository<Artist>,
}

impl KvArtistRepository {
    /// Create a new KvArtistRepository
    pub fn new(store: Arc<dyn KvStore>) -> Result<Self> {
        Ok(Self {
            inner: KvRepository::new(store)?,
        })
    }
}

#[async_trait]
impl ArtistRepository for KvArtistRepository {
    async fn count_all(&self) -> Result<i64> {
        self.inner.count_all().await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn get(&self, id: &str) -> Result<Artist> {
        self.inner.get(id).await
    }

    async fn put(&self, artist: &Artist) -> Result<()> {
        self.inner.put(artist).await
    }

    async fn get_all(&self, options: &QueryOptions) -> Result<Vec<Artist>> {
        let options = options.clone().or_sorted_by("Name", true);
        self.inner.load_all(&options).await
    }

    async fn purge_inactive(&self, active: &[Artist]) -> Result<Vec<String>> {
        self.inner.purge_inactive(active).await
    }

    async fn remove(&self, ids: &[String]) -> Result<Vec<String>> {
        self.inner.remove(ids).await
    }
}
