//! Album repository trait and implementation

use crate::codec::{field, Entity, FieldDescriptor, IndexSpec, ParentRelation, ScalarKind, ScalarValue};
use crate::error::Result;
use crate::models::{Album, Artist};
use crate::query::QueryOptions;
use crate::repositories::KvRepository;
use async_trait::async_trait;
use core_store::KvStore;
use std::sync::Arc;

fn album_artist_id(album: &Album) -> &str {
    &album.artist_id
}

impl Entity for Album {
    const TABLE: &'static str = "album";

    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(Album, "Id", id),
            field!(Album, "Name", name),
            field!(Album, "ArtistId", artist_id),
            field!(Album, "CoverArtPath", cover_art_path),
            field!(Album, "CoverArtId", cover_art_id),
            field!(Album, "Artist", artist),
            field!(Album, "AlbumArtist", album_artist),
            field!(Album, "Year", year),
            field!(Album, "Compilation", compilation),
            field!(Album, "Starred", starred),
            field!(Album, "PlayCount", play_count),
            field!(Album, "PlayDate", play_date),
            field!(Album, "SongCount", song_count),
            field!(Album, "Duration", duration),
            field!(Album, "Rating", rating),
            field!(Album, "Genre", genre),
            field!(Album, "StarredAt", starred_at),
            field!(Album, "CreatedAt", created_at),
            field!(Album, "UpdatedAt", updated_at),
        ]
    }

    fn indexes() -> Vec<IndexSpec<Self>> {
        vec![
            IndexSpec {
                name: "starred",
                field: "Starred",
                kind: ScalarKind::Boolean,
                project: |album: &Album| ScalarValue::Boolean(album.starred),
            },
            IndexSpec {
                name: "year",
                field: "Year",
                kind: ScalarKind::Integer,
                project: |album: &Album| ScalarValue::from(album.year),
            },
        ]
    }

    fn parent() -> Option<ParentRelation<Self>> {
        Some(ParentRelation {
            table: Artist::TABLE,
            field: "ArtistId",
            parent_id: album_artist_id,
        })
    }
}

/// Album repository interface for data access operations
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// Count all albums
    async fn count_all(&self) -> Result<i64>;

    /// Check whether an album exists
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Find an album by its ID
    ///
    /// # Errors
    /// Returns `LibraryError::NotFound` if no album has this ID
    async fn get(&self, id: &str) -> Result<Album>;

    /// Insert or fully overwrite an album
    async fn put(&self, album: &Album) -> Result<()>;

    /// List albums
    ///
    /// Sorted by name unless `options` asks for another order.
    async fn get_all(&self, options: &QueryOptions) -> Result<Vec<Album>>;

    /// Albums of an artist
    ///
    /// # Arguments
    /// * `artist_id` - Artist identifier
    /// * `options` - Offset, size and ordering
    async fn find_by_artist(&self, artist_id: &str, options: &QueryOptions) -> Result<Vec<Album>>;

    /// Starred albums
    async fn get_starred(&self, options: &QueryOptions) -> Result<Vec<Album>>;

    /// Albums released between `from` and `to`, both inclusive
    async fn find_by_year(&self, from: i32, to: i32, options: &QueryOptions) -> Result<Vec<Album>>;

    /// Remove albums absent from `active`, returning removed IDs
    async fn purge_inactive(&self, active: &[Album]) -> Result<Vec<String>>;

    /// Remove albums by ID, returning those that existed
    async fn remove(&self, ids: &[String]) -> Result<Vec<String>>;
}

/// Key-value store implementation of AlbumRepository
#[derive(Clone)]
pub struct KvAlbumRepository {
    inner: KvRepository<Album>,
}

impl KvAlbumRepository {
    /// Create a new KvAlbumRepository
    pub fn new(store: Arc<dyn KvStore>) -> Result<Self> {
        Ok(Self {
            inner: KvRepository::new(store)?,
        })
    }
}

#[async_trait]
impl AlbumRepository for KvAlbumRepository {
    async fn count_all(&self) -> Result<i64> {
        self.inner.count_all().await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn get(&self, id: &str) -> Result<Album> {
        self.inner.get(id).await
    }

    async fn put(&self, album: &Album) -> Result<()> {
        self.inner.put(album).await
    }

    async fn get_all(&self, options: &QueryOptions) -> Result<Vec<Album>> {
        let options = options.clone().or_sorted_by("Name", true);
        self.inner.load_all(&options).await
    }

    async fn find_by_artist(&self, artist_id: &str, options: &QueryOptions) -> Result<Vec<Album>> {
        self.inner
            .load_children(Artist::TABLE, artist_id, options)
            .await
    }

    async fn get_starred(&self, options: &QueryOptions) -> Result<Vec<Album>> {
        self.inner
            .load_range("starred", true.into(), true.into(), options)
            .await
    }

    async fn find_by_year(&self, from: i32, to: i32, options: &QueryOptions) -> Result<Vec<Album>> {
        self.inner
            .load_range("year", from.into(), to.into(), options)
            .await
    }

    async fn purge_inactive(&self, active: &[Album]) -> Result<Vec<String>> {
        self.inner.purge_inactive(active).await
    }

    async fn remove(&self, ids: &[String]) -> Result<Vec<String>> {
        self.inner.remove(ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use chrono::{TimeZone, Utc};
    use core_store::SqliteKvStore;

    async fn setup_test_repo() -> KvAlbumRepository {
        let store = SqliteKvStore::in_memory().await.unwrap();
        KvAlbumRepository::new(Arc::new(store)).unwrap()
    }

    fn album(id: &str, name: &str, artist_id: &str, year: i32) -> Album {
        let mut album = Album::new(id, name, artist_id);
        album.year = year;
        album
    }

    fn ids(albums: &[Album]) -> Vec<&str> {
        albums.iter().map(|a| a.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_put_and_get_album() {
        let repo = setup_test_repo().await;
        let mut original = album("al1", "Abbey Road", "ar1", 1969);
        original.song_count = 17;
        original.genre = "Rock".to_string();

        repo.put(&original).await.unwrap();

        let found = repo.get("al1").await.unwrap();
        assert_eq!(found, original);
    }

    #[tokio::test]
    async fn test_overwrite_album() {
        let repo = setup_test_repo().await;
        let mut original = album("al1", "Original Name", "ar1", 1969);
        repo.put(&original).await.unwrap();

        original.name = "Updated Name".to_string();
        repo.put(&original).await.unwrap();

        assert_eq!(repo.get("al1").await.unwrap().name, "Updated Name");
        assert_eq!(repo.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_all_defaults_to_name_order() {
        let repo = setup_test_repo().await;
        repo.put(&album("1", "Revolver", "ar1", 1966)).await.unwrap();
        repo.put(&album("2", "Help!", "ar1", 1965)).await.unwrap();
        repo.put(&album("3", "Let It Be", "ar1", 1970)).await.unwrap();

        let albums = repo.get_all(&QueryOptions::new()).await.unwrap();
        assert_eq!(ids(&albums), vec!["2", "3", "1"]);

        let by_year = repo
            .get_all(&QueryOptions::sorted_by("Year").with_descending(true))
            .await
            .unwrap();
        assert_eq!(ids(&by_year), vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_get_all_with_pagination() {
        let repo = setup_test_repo().await;
        for i in 1..=5 {
            repo.put(&album(&format!("al{}", i), &format!("Album {}", i), "ar1", 2000))
                .await
                .unwrap();
        }

        let page = repo
            .get_all(&QueryOptions::new().with_page(3, 3))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["al4", "al5"]);
    }

    #[tokio::test]
    async fn test_find_by_artist() {
        let repo = setup_test_repo().await;
        repo.put(&album("al1", "Album 1", "ar1", 2001)).await.unwrap();
        repo.put(&album("al2", "Album 2", "ar1", 2002)).await.unwrap();
        repo.put(&album("al3", "Album 3", "ar2", 2003)).await.unwrap();

        let albums = repo
            .find_by_artist("ar1", &QueryOptions::sorted_by("Year").with_descending(true))
            .await
            .unwrap();
        assert_eq!(ids(&albums), vec!["al2", "al1"]);
    }

    #[tokio::test]
    async fn test_find_by_year_is_inclusive() {
        let repo = setup_test_repo().await;
        repo.put(&album("a", "A", "ar1", 1965)).await.unwrap();
        repo.put(&album("b", "B", "ar1", 1969)).await.unwrap();
        repo.put(&album("c", "C", "ar1", 1970)).await.unwrap();
        repo.put(&album("d", "D", "ar1", 1971)).await.unwrap();

        let albums = repo
            .find_by_year(1969, 1970, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(ids(&albums), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_get_starred() {
        let repo = setup_test_repo().await;
        let mut starred = album("al1", "Starred", "ar1", 2000);
        starred.starred = true;
        repo.put(&starred).await.unwrap();
        repo.put(&album("al2", "Plain", "ar1", 2000)).await.unwrap();

        let albums = repo.get_starred(&QueryOptions::new()).await.unwrap();
        assert_eq!(ids(&albums), vec!["al1"]);

        starred.starred = false;
        repo.put(&starred).await.unwrap();
        assert!(repo.get_starred(&QueryOptions::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_sorted_by_boolean_field() {
        let repo = setup_test_repo().await;
        let mut starred = album("a1", "Starred", "ar1", 2000);
        starred.starred = true;
        repo.put(&starred).await.unwrap();
        repo.put(&album("a2", "Plain", "ar1", 2000)).await.unwrap();

        let albums = repo
            .get_all(&QueryOptions::sorted_by("Starred"))
            .await
            .unwrap();
        assert_eq!(ids(&albums), vec!["a2", "a1"]);
    }

    #[tokio::test]
    async fn test_get_all_sorted_by_timestamp_field() {
        let repo = setup_test_repo().await;
        let mut recent = album("a1", "Recent", "ar1", 2000);
        recent.created_at = Utc.with_ymd_and_hms(2016, 3, 1, 10, 0, 0).unwrap();
        let mut older = album("a2", "Older", "ar1", 2000);
        older.created_at = Utc.with_ymd_and_hms(2012, 7, 4, 8, 30, 0).unwrap();
        repo.put(&recent).await.unwrap();
        repo.put(&older).await.unwrap();
        repo.put(&album("a3", "Never Set", "ar1", 2000)).await.unwrap();

        let albums = repo
            .get_all(&QueryOptions::sorted_by("CreatedAt").with_descending(true))
            .await
            .unwrap();
        assert_eq!(ids(&albums), vec!["a1", "a2", "a3"]);
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_rejected() {
        let repo = setup_test_repo().await;
        let result = repo.get_all(&QueryOptions::sorted_by("Label")).await;
        assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_remove_album() {
        let repo = setup_test_repo().await;
        repo.put(&album("al1", "Album", "ar1", 1999)).await.unwrap();

        let removed = repo.remove(&["al1".to_string()]).await.unwrap();
        assert_eq!(removed, vec!["al1"]);
        assert!(repo.find_by_artist("ar1", &QueryOptions::new()).await.unwrap().is_empty());
        assert!(repo.find_by_year(1999, 1999, &QueryOptions::new()).await.unwrap().is_empty());
    }
}
