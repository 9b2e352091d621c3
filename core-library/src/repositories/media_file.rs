//! Media file repository trait and implementation

use crate::codec::{field, Entity, FieldDescriptor, IndexSpec, ParentRelation, ScalarKind, ScalarValue};
use crate::error::Result;
use crate::models::{Album, MediaFile};
use crate::query::QueryOptions;
use crate::repositories::KvRepository;
use async_trait::async_trait;
use core_store::KvStore;
use std::sync::Arc;

fn media_file_album_id(media_file: &MediaFile) -> &str {
    &media_file.album_id
}

impl Entity for MediaFile {
    const TABLE: &'static str = "mediafile";

    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(MediaFile, "Id", id),
            field!(MediaFile, "Path", path),
            field!(MediaFile, "Title", title),
            field!(MediaFile, "Album", album),
            field!(MediaFile, "Artist", artist),
            field!(MediaFile, "AlbumArtist", album_artist),
            field!(MediaFile, "AlbumId", album_id),
            field!(MediaFile, "HasCoverArt", has_cover_art),
            field!(MediaFile, "TrackNumber", track_number),
            field!(MediaFile, "DiscNumber", disc_number),
            field!(MediaFile, "Year", year),
            field!(MediaFile, "Size", size),
            field!(MediaFile, "Suffix", suffix),
            field!(MediaFile, "Duration", duration),
            field!(MediaFile, "BitRate", bit_rate),
            field!(MediaFile, "Genre", genre),
            field!(MediaFile, "Compilation", compilation),
            field!(MediaFile, "PlayCount", play_count),
            field!(MediaFile, "PlayDate", play_date),
            field!(MediaFile, "Rating", rating),
            field!(MediaFile, "Starred", starred),
            field!(MediaFile, "StarredAt", starred_at),
            field!(MediaFile, "CreatedAt", created_at),
            field!(MediaFile, "UpdatedAt", updated_at),
        ]
    }

    fn indexes() -> Vec<IndexSpec<Self>> {
        vec![
            IndexSpec {
                name: "starred",
                field: "Starred",
                kind: ScalarKind::Boolean,
                project: |media_file: &MediaFile| ScalarValue::Boolean(media_file.starred),
            },
            IndexSpec {
                name: "play_date",
                field: "PlayDate",
                kind: ScalarKind::Timestamp,
                project: |media_file: &MediaFile| ScalarValue::Timestamp(media_file.play_date),
            },
        ]
    }

    fn parent() -> Option<ParentRelation<Self>> {
        Some(ParentRelation {
            table: Album::TABLE,
            field: "AlbumId",
            parent_id: media_file_album_id,
        })
    }
}

/// Media file repository interface for data access operations
#[async_trait]
pub trait MediaFileRepository: Send + Sync {
    /// Count all media files
    async fn count_all(&self) -> Result<i64>;

    /// Check whether a media file exists
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Find a media file by its ID
    ///
    /// # Errors
    /// Returns `LibraryError::NotFound` if no media file has this ID
    async fn get(&self, id: &str) -> Result<MediaFile>;

    /// Insert or fully overwrite a media file
    async fn put(&self, media_file: &MediaFile) -> Result<()>;

    /// List media files in `options` order, natural set order by default
    async fn load_all(&self, options: &QueryOptions) -> Result<Vec<MediaFile>>;

    /// Media files of an album in `options` order
    async fn load_children(&self, album_id: &str, options: &QueryOptions)
        -> Result<Vec<MediaFile>>;

    /// Tracks of an album, ordered by disc then track number
    async fn find_by_album(&self, album_id: &str) -> Result<Vec<MediaFile>>;

    /// Starred media files
    async fn get_starred(&self, options: &QueryOptions) -> Result<Vec<MediaFile>>;

    /// Media files that were played, most recent first
    async fn get_recently_played(&self, options: &QueryOptions) -> Result<Vec<MediaFile>>;

    /// Media files whose `index` value lies in `[min, max]`
    async fn load_range(
        &self,
        index: &str,
        min: ScalarValue,
        max: ScalarValue,
        options: &QueryOptions,
    ) -> Result<Vec<MediaFile>>;

    /// Remove media files absent from `active`, returning removed IDs
    async fn purge_inactive(&self, active: &[MediaFile]) -> Result<Vec<String>>;

    /// Remove media files by ID, returning those that existed
    async fn remove(&self, ids: &[String]) -> Result<Vec<String>>;
}

/// Key-value store implementation of MediaFileRepository
#[derive(Clone)]
pub struct KvMediaFileRepository {
    inner: KvRepository<MediaFile>,
}

impl KvMediaFileRepository {
    /// Create a new KvMediaFileRepository
    pub fn new(store: Arc<dyn KvStore>) -> Result<Self> {
        Ok(Self {
            inner: KvRepository::new(store)?,
        })
    }
}

#[async_trait]
impl MediaFileRepository for KvMediaFileRepository {
    async fn count_all(&self) -> Result<i64> {
        self.inner.count_all().await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn get(&self, id: &str) -> Result<MediaFile> {
        self.inner.get(id).await
    }

    async fn put(&self, media_file: &MediaFile) -> Result<()> {
        self.inner.put(media_file).await
    }

    async fn load_all(&self, options: &QueryOptions) -> Result<Vec<MediaFile>> {
        self.inner.load_all(options).await
    }

    async fn load_children(
        &self,
        album_id: &str,
        options: &QueryOptions,
    ) -> Result<Vec<MediaFile>> {
        self.inner
            .load_children(Album::TABLE, album_id, options)
            .await
    }

    async fn find_by_album(&self, album_id: &str) -> Result<Vec<MediaFile>> {
        let mut tracks = self
            .inner
            .load_children(Album::TABLE, album_id, &QueryOptions::sorted_by("TrackNumber"))
            .await?;
        // Stable, so track order survives within each disc
        tracks.sort_by_key(|track| track.disc_number);
        Ok(tracks)
    }

    async fn get_starred(&self, options: &QueryOptions) -> Result<Vec<MediaFile>> {
        self.inner
            .load_range("starred", true.into(), true.into(), options)
            .await
    }

    async fn get_recently_played(&self, options: &QueryOptions) -> Result<Vec<MediaFile>> {
        // Never-played files carry the epoch and are excluded
        let options = options.clone().with_descending(true);
        self.inner
            .load_range(
                "play_date",
                ScalarValue::Integer(1),
                ScalarValue::Integer(i64::MAX),
                &options,
            )
            .await
    }

    async fn load_range(
        &self,
        index: &str,
        min: ScalarValue,
        max: ScalarValue,
        options: &QueryOptions,
    ) -> Result<Vec<MediaFile>> {
        self.inner.load_range(index, min, max, options).await
    }

    async fn purge_inactive(&self, active: &[MediaFile]) -> Result<Vec<String>> {
        self.inner.purge_inactive(active).await
    }

    async fn remove(&self, ids: &[String]) -> Result<Vec<String>> {
        self.inner.remove(ids).await
    }
}
