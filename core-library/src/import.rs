//! # Library Import
//!
//! Reconciles the catalog with a fresh scan of the media library.
//!
//! ## Workflow
//!
//! 1. Read the `LastScan` property (epoch milliseconds, absent on first run)
//! 2. Ask the [`LibraryScanner`] for a complete snapshot
//! 3. Write media files and albums updated since the last scan, and every
//!    artist and playlist
//! 4. Rebuild the artist index from the scanned artists
//! 5. Purge records and index groups that are no longer part of the snapshot
//! 6. Record the new `LastScan`
//!
//! Any failure aborts the import without touching `LastScan`, so the next run
//! repeats the work.

use crate::error::{LibraryError, Result};
use crate::indexing::ArtistIndexer;
use crate::models::{Album, Artist, ArtistIndex, MediaFile, Playlist};
use crate::persistence::Persistence;
use crate::repositories::{
    AlbumRepository, ArtistIndexRepository, ArtistRepository, MediaFileRepository,
    PlaylistRepository, PropertyRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Property holding the time of the last successful import
pub const LAST_SCAN_PROPERTY: &str = "LastScan";

/// Everything a scan found in the media library
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    pub media_files: Vec<MediaFile>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub playlists: Vec<Playlist>,
}

/// Source of library snapshots
///
/// The snapshot must always be complete: records missing from it are purged.
/// `since` only tells the scanner which files it may skip re-reading.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryScanner: Send + Sync {
    async fn scan(&self, since: DateTime<Utc>) -> Result<LibrarySnapshot>;
}

/// Per-table outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    /// Records before the import
    pub before: i64,
    /// Records after the import
    pub after: i64,
    /// Records written
    pub updated: usize,
    /// Records purged
    pub removed: usize,
}

impl TableSummary {
    pub fn delta(&self) -> i64 {
        self.after - self.before
    }
}

/// Outcome of [`Importer::import`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Whether this was the first import
    pub first_scan: bool,
    pub media_files: TableSummary,
    pub albums: TableSummary,
    pub artists: TableSummary,
    /// Artist index groups
    pub artist_indexes: TableSummary,
    pub playlists: TableSummary,
}

impl ImportSummary {
    /// Whether any table changed size
    pub fn totals_changed(&self) -> bool {
        [
            self.media_files,
            self.albums,
            self.artists,
            self.artist_indexes,
            self.playlists,
        ]
        .iter()
        .any(|table| table.delta() != 0)
    }
}

/// Drives a scan and writes the result through the repositories
pub struct Importer {
    scanner: Arc<dyn LibraryScanner>,
    media_files: Arc<dyn MediaFileRepository>,
    albums: Arc<dyn AlbumRepository>,
    artists: Arc<dyn ArtistRepository>,
    artist_indexes: Arc<dyn ArtistIndexRepository>,
    playlists: Arc<dyn PlaylistRepository>,
    properties: Arc<dyn PropertyRepository>,
    indexer: ArtistIndexer,
    playlist_owner: Option<String>,
}

impl Importer {
    pub fn new(
        scanner: Arc<dyn LibraryScanner>,
        media_files: Arc<dyn MediaFileRepository>,
        albums: Arc<dyn AlbumRepository>,
        artists: Arc<dyn ArtistRepository>,
        artist_indexes: Arc<dyn ArtistIndexRepository>,
        playlists: Arc<dyn PlaylistRepository>,
        properties: Arc<dyn PropertyRepository>,
    ) -> Self {
        Self {
            scanner,
            media_files,
            albums,
            artists,
            artist_indexes,
            playlists,
            properties,
            indexer: ArtistIndexer::default(),
            playlist_owner: None,
        }
    }

    /// Build an importer over the repositories of `persistence`
    pub async fn from_persistence(
        scanner: Arc<dyn LibraryScanner>,
        persistence: &Persistence,
    ) -> Result<Self> {
        Ok(Self::new(
            scanner,
            Arc::new(persistence.media_files().await?),
            Arc::new(persistence.albums().await?),
            Arc::new(persistence.artists().await?),
            Arc::new(persistence.artist_indexes().await?),
            Arc::new(persistence.playlists().await?),
            Arc::new(persistence.properties().await?),
        ))
    }

    /// Group the artist index with `indexer` instead of the default layout
    pub fn with_artist_indexer(mut self, indexer: ArtistIndexer) -> Self {
        self.indexer = indexer;
        self
    }

    /// Publish imported playlists under `owner`
    ///
    /// Playlists are then marked public and their comment records the file
    /// they came from.
    pub fn with_playlist_owner(mut self, owner: impl Into<String>) -> Self {
        self.playlist_owner = Some(owner.into());
        self
    }

    /// Run one import cycle
    #[instrument(skip(self))]
    pub async fn import(&self) -> Result<ImportSummary> {
        let last_scan = self.last_scan().await?;
        let first_scan = last_scan.timestamp_millis() == 0;
        if first_scan {
            info!("Starting first library scan");
        }

        let snapshot = self.scanner.scan(last_scan).await?;
        debug!(
            media_files = snapshot.media_files.len(),
            albums = snapshot.albums.len(),
            artists = snapshot.artists.len(),
            playlists = snapshot.playlists.len(),
            "Scan complete"
        );

        let mut summary = ImportSummary {
            first_scan,
            ..ImportSummary::default()
        };
        summary.media_files.before = self.media_files.count_all().await?;
        summary.albums.before = self.albums.count_all().await?;
        summary.artists.before = self.artists.count_all().await?;
        summary.artist_indexes.before = self.artist_indexes.count_all().await?;
        summary.playlists.before = self.playlists.count_all().await?;

        debug!("Saving updated data");
        summary.media_files.updated = self
            .import_media_files(&snapshot.media_files, last_scan)
            .await?;
        summary.albums.updated = self.import_albums(&snapshot.albums, last_scan).await?;
        summary.artists.updated = self.import_artists(&snapshot.artists).await?;
        let artist_index = self.indexer.build(&snapshot.artists);
        summary.artist_indexes.updated = self.import_artist_index(&artist_index).await?;
        let playlists = self.prepare_playlists(&snapshot.playlists);
        summary.playlists.updated = self.import_playlists(&playlists).await?;

        debug!("Purging old data");
        summary.media_files.removed = self
            .media_files
            .purge_inactive(&snapshot.media_files)
            .await?
            .len();
        summary.albums.removed = self.albums.purge_inactive(&snapshot.albums).await?.len();
        summary.artists.removed = self.artists.purge_inactive(&snapshot.artists).await?.len();
        summary.artist_indexes.removed = self
            .artist_indexes
            .purge_inactive(&artist_index)
            .await?
            .len();
        summary.playlists.removed = self.playlists.purge_inactive(&playlists).await?.len();

        summary.media_files.after = self.media_files.count_all().await?;
        summary.albums.after = self.albums.count_all().await?;
        summary.artists.after = self.artists.count_all().await?;
        summary.artist_indexes.after = self.artist_indexes.count_all().await?;
        summary.playlists.after = self.playlists.count_all().await?;

        if summary.totals_changed() {
            info!(
                artists = summary.artists.after,
                artists_delta = summary.artists.delta(),
                albums = summary.albums.after,
                albums_delta = summary.albums.delta(),
                media_files = summary.media_files.after,
                media_files_delta = summary.media_files.delta(),
                playlists = summary.playlists.after,
                playlists_delta = summary.playlists.delta(),
                "Updated library totals"
            );
        }
        if summary.albums.updated > 0 || summary.media_files.updated > 0 {
            info!(
                albums = summary.albums.updated,
                media_files = summary.media_files.updated,
                "Updated items"
            );
        }

        let millis = Utc::now().timestamp_millis();
        self.properties
            .put(LAST_SCAN_PROPERTY, &millis.to_string())
            .await?;
        debug!(last_scan = millis, "Recorded scan time");

        if first_scan {
            info!("Finished first library import");
        }
        Ok(summary)
    }

    /// Time of the last import, the epoch if there was none
    async fn last_scan(&self) -> Result<DateTime<Utc>> {
        let raw = self.properties.default_get(LAST_SCAN_PROPERTY, "").await?;
        if raw.is_empty() {
            return Ok(DateTime::<Utc>::default());
        }

        match raw.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis) {
            Some(time) => Ok(time),
            None => {
                warn!(value = %raw, "Ignoring malformed LastScan property");
                Ok(DateTime::<Utc>::default())
            }
        }
    }

    async fn import_media_files(
        &self,
        media_files: &[MediaFile],
        last_scan: DateTime<Utc>,
    ) -> Result<usize> {
        let mut updates = 0;
        for media_file in media_files {
            if media_file.updated_at < last_scan {
                continue;
            }

            let mut media_file = media_file.clone();
            if media_file.starred {
                let previous = previous_record(self.media_files.get(&media_file.id).await)?;
                media_file.starred_at = match previous {
                    Some(previous) if previous.starred => previous.starred_at,
                    _ => media_file.updated_at,
                };
            }

            self.media_files.put(&media_file).await?;
            updates += 1;
            debug!(id = %media_file.id, title = %media_file.title, "Updated media file");
        }
        Ok(updates)
    }

    async fn import_albums(&self, albums: &[Album], last_scan: DateTime<Utc>) -> Result<usize> {
        let mut updates = 0;
        for album in albums {
            if album.updated_at < last_scan {
                continue;
            }

            let mut album = album.clone();
            if album.starred {
                let previous = previous_record(self.albums.get(&album.id).await)?;
                album.starred_at = match previous {
                    Some(previous) if previous.starred => previous.starred_at,
                    _ => album.updated_at,
                };
            }

            self.albums.put(&album).await?;
            updates += 1;
            debug!(id = %album.id, name = %album.name, artist = %album.artist, "Updated album");
        }
        Ok(updates)
    }

    async fn import_artists(&self, artists: &[Artist]) -> Result<usize> {
        for artist in artists {
            self.artists.put(artist).await?;
        }
        Ok(artists.len())
    }

    async fn import_artist_index(&self, artist_index: &[ArtistIndex]) -> Result<usize> {
        for index in artist_index {
            self.artist_indexes.put(index).await?;
        }
        debug!(groups = artist_index.len(), "Saved artist index");
        Ok(artist_index.len())
    }

    async fn import_playlists(&self, playlists: &[Playlist]) -> Result<usize> {
        for playlist in playlists {
            self.playlists.put(playlist).await?;
        }
        Ok(playlists.len())
    }

    fn prepare_playlists(&self, playlists: &[Playlist]) -> Vec<Playlist> {
        let Some(owner) = &self.playlist_owner else {
            return playlists.to_vec();
        };

        playlists
            .iter()
            .map(|playlist| Playlist {
                public: true,
                owner: owner.clone(),
                comment: format!("Original: {}", playlist.full_path),
                ..playlist.clone()
            })
            .collect()
    }
}

/// Previously stored record, `None` when there is none
fn previous_record<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(record) => Ok(Some(record)),
        Err(LibraryError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
