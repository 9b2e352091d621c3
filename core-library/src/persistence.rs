//! # Persistence Context
//!
//! Owns the catalog's store handle and hands out repositories that share it.
//!
//! The store is opened lazily on first use. Concurrent first calls race on a
//! [`OnceCell`], so the database is opened (and migrated) exactly once.
//!
//! ```rust,ignore
//! use core_library::persistence::Persistence;
//! use core_library::repositories::AlbumRepository;
//! use core_store::StoreConfig;
//!
//! let persistence = Persistence::new(StoreConfig::new("catalog.db"));
//! let albums = persistence.albums().await?;
//! let album = albums.get("al-1").await?;
//! ```

use crate::error::Result;
use crate::repositories::{
    KvAlbumRepository, KvArtistIndexRepository, KvArtistRepository, KvMediaFileRepository,
    KvPlaylistRepository, KvPropertyRepository,
};
use core_store::{KvStore, SqliteKvStore, StoreConfig};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Application-wide persistence context
pub struct Persistence {
    config: StoreConfig,
    store: OnceCell<Arc<dyn KvStore>>,
}

impl Persistence {
    /// Create a context that opens a SQLite store from `config` on first use
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            store: OnceCell::new(),
        }
    }

    /// Create a context around an already-open store
    pub fn with_store(store: Arc<dyn KvStore>) -> Self {
        Self {
            config: StoreConfig::default(),
            store: OnceCell::new_with(Some(store)),
        }
    }

    /// The shared store handle, opening it if needed
    ///
    /// # Errors
    ///
    /// Returns the store error if opening fails. A later call retries.
    pub async fn store(&self) -> Result<Arc<dyn KvStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                info!(database_url = %self.config.database_url, "Opening catalog store");
                let store = SqliteKvStore::open(self.config.clone()).await?;
                Ok::<_, crate::error::LibraryError>(Arc::new(store) as Arc<dyn KvStore>)
            })
            .await?;
        Ok(Arc::clone(store))
    }

    /// Whether the store has been opened
    pub fn is_initialized(&self) -> bool {
        self.store.initialized()
    }

    pub async fn media_files(&self) -> Result<KvMediaFileRepository> {
        KvMediaFileRepository::new(self.store().await?)
    }

    pub async fn albums(&self) -> Result<KvAlbumRepository> {
        KvAlbumRepository::new(self.store().await?)
    }

    pub async fn artists(&self) -> Result<KvArtistRepository> {
        KvArtistRepository::new(self.store().await?)
    }

    pub async fn artist_indexes(&self) -> Result<KvArtistIndexRepository> {
        KvArtistIndexRepository::new(self.store().await?)
    }

    pub async fn playlists(&self) -> Result<KvPlaylistRepository> {
        KvPlaylistRepository::new(self.store().await?)
    }

    pub async fn properties(&self) -> Result<KvPropertyRepository> {
        KvPropertyRepository::new(self.store().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Artist;
    use crate::repositories::{ArtistRepository, PropertyRepository};
    use futures::future::join_all;

    #[tokio::test]
    async fn test_store_opened_lazily() {
        let persistence = Persistence::new(StoreConfig::in_memory());
        assert!(!persistence.is_initialized());

        persistence.store().await.unwrap();
        assert!(persistence.is_initialized());
    }

    #[tokio::test]
    async fn test_concurrent_first_use_opens_once() {
        let persistence = Arc::new(Persistence::new(StoreConfig::in_memory()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let persistence = Arc::clone(&persistence);
                tokio::spawn(async move { persistence.store().await.unwrap() })
            })
            .collect();

        let stores: Vec<Arc<dyn KvStore>> = join_all(handles)
            .await
            .into_iter()
            .map(|handle| handle.unwrap())
            .collect();

        for store in &stores[1..] {
            assert!(Arc::ptr_eq(&stores[0], store));
        }
    }

    #[tokio::test]
    async fn test_repositories_share_store() {
        let persistence = Persistence::new(StoreConfig::in_memory());

        persistence
            .artists()
            .await
            .unwrap()
            .put(&Artist::new("ar1", "Nirvana"))
            .await
            .unwrap();

        let artists = persistence.artists().await.unwrap();
        assert_eq!(artists.get("ar1").await.unwrap().name, "Nirvana");
    }

    #[tokio::test]
    async fn test_with_store_uses_given_handle() {
        let store: Arc<dyn KvStore> = Arc::new(SqliteKvStore::in_memory().await.unwrap());
        let persistence = Persistence::with_store(Arc::clone(&store));
        assert!(persistence.is_initialized());

        let properties = persistence.properties().await.unwrap();
        properties.put("LastScan", "42").await.unwrap();

        assert!(Arc::ptr_eq(&persistence.store().await.unwrap(), &store));
        assert_eq!(store.zcard("propertys:all").await.unwrap(), 1);
    }
}
