//! Playlist repository trait and implementation

use crate::codec::{field, Entity, FieldDescriptor};
use crate::error::Result;
use crate::models::Playlist;
use crate::query::QueryOptions;
use crate::repositories::KvRepository;
use async_trait::async_trait;
use core_store::KvStore;
use std::sync::Arc;

impl Entity for Playlist {
    const TABLE: &'static str = "playlist";

    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(Playlist, "Id", id),
            field!(Playlist, "Name", name),
            field!(Playlist, "Comment", comment),
            field!(Playlist, "FullPath", full_path),
            field!(Playlist, "Duration", duration),
            field!(Playlist, "Owner", owner),
            field!(Playlist, "Public", public),
            field!(Playlist, "Tracks", tracks),
        ]
    }
}

/// Playlist repository interface for data access operations
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Count all playlists
    async fn count_all(&self) -> Result<i64>;

    /// Check whether a playlist exists
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Find a playlist by its ID
    ///
    /// # Errors
    /// Returns `LibraryError::NotFound` if no playlist has this ID
    async fn get(&self, id: &str) -> Result<Playlist>;

    /// Insert or fully overwrite a playlist, including its track list
    async fn put(&self, playlist: &Playlist) -> Result<()>;

    /// List playlists
    ///
    /// # Arguments
    /// * `options` - Offset, size and ordering; sorted by name by default
    async fn get_all(&self, options: &QueryOptions) -> Result<Vec<Playlist>>;

    /// Remove playlists absent from `active`, returning removed IDs
    async fn purge_inactive(&self, active: &[Playlist]) -> Result<Vec<String>>;

    /// Remove playlists by ID, returning those that existed
    async fn remove(&self, ids: &[String]) -> Result<Vec<String>>;
}

/// Key-value store implementation of PlaylistRepository
#[derive(Clone)]
pub struct KvPlaylistRepository {
    inner: KvRepository<Playlist>,
}

impl KvPlaylistRepository {
    /// Create a new KvPlaylistRepository
    pub fn new(store: Arc<dyn KvStore>) -> Result<Self> {
        Ok(Self {
            inner: KvRepository::new(store)?,
        })
    }
}

#[async_trait]
impl PlaylistRepository for KvPlaylistRepository {
    async fn count_all(&self) -> Result<i64> {
        self.inner.count_all().await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn get(&self, id: &str) -> Result<Playlist> {
        self.inner.get(id).await
    }

    async fn put(&self, playlist: &Playlist) -> Result<()> {
        self.inner.put(playlist).await
    }

    async fn get_all(&self, options: &QueryOptions) -> Result<Vec<Playlist>> {
        let options = options.clone().or_sorted_by("Name", true);
        self.inner.load_all(&options).await
    }

    async fn purge_inactive(&self, active: &[Playlist]) -> Result<Vec<String>> {
        self.inner.purge_inactive(active).await
    }

    async fn remove(&self, ids: &[String]) -> Result<Vec<String>> {
        self.inner.remove(ids).await
    }
}
