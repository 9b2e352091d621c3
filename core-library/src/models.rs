//! Domain models for the media catalog
//!
//! Plain records; how each one is laid out in the store is declared next to
//! its repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audio file in the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Unique identifier
    pub id: String,
    /// Location in the media folder
    pub path: String,
    pub title: String,
    /// Album name as tagged
    pub album: String,
    /// Track artist name
    pub artist: String,
    /// Album artist name (for compilations)
    pub album_artist: String,
    /// Parent album reference
    pub album_id: String,
    pub has_cover_art: bool,
    pub track_number: i32,
    pub disc_number: i32,
    pub year: i32,
    /// File size in bytes
    pub size: i64,
    /// File extension (mp3, flac, m4a, ...)
    pub suffix: String,
    /// Duration in seconds
    pub duration: i32,
    /// Bitrate in kbps
    pub bit_rate: i32,
    pub genre: String,
    pub compilation: bool,
    pub play_count: i32,
    /// Last time the file was played
    pub play_date: DateTime<Utc>,
    pub rating: i32,
    pub starred: bool,
    /// When the file was starred
    pub starred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaFile {
    /// Create a media file belonging to `album_id`
    pub fn new(id: impl Into<String>, title: impl Into<String>, album_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            album_id: album_id.into(),
            ..Self::default()
        }
    }
}

/// Album with metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Unique identifier
    pub id: String,
    pub name: String,
    /// Parent artist reference
    pub artist_id: String,
    pub cover_art_path: String,
    pub cover_art_id: String,
    /// Artist name
    pub artist: String,
    pub album_artist: String,
    pub year: i32,
    pub compilation: bool,
    pub starred: bool,
    pub play_count: i32,
    pub play_date: DateTime<Utc>,
    /// Cached number of songs
    pub song_count: i32,
    /// Cached total duration in seconds
    pub duration: i32,
    pub rating: i32,
    pub genre: String,
    pub starred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Album {
    /// Create an album belonging to `artist_id`
    pub fn new(id: impl Into<String>, name: impl Into<String>, artist_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist_id: artist_id.into(),
            ..Self::default()
        }
    }
}

/// Music artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Unique identifier
    pub id: String,
    pub name: String,
    /// Cached number of albums
    pub album_count: i32,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            album_count: 0,
        }
    }
}

/// An artist as listed under an index group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub artist_id: String,
    /// Artist name as displayed
    pub artist: String,
    pub album_count: i32,
}

/// Artists grouped under one index entry ("A", "X-Z", "#", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistIndex {
    /// Group name
    pub id: String,
    /// Members ordered by their index name
    pub artists: Vec<ArtistInfo>,
}

/// Playlist imported from the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique identifier
    pub id: String,
    pub name: String,
    pub comment: String,
    /// Playlist file location
    pub full_path: String,
    /// Total duration in seconds
    pub duration: i32,
    pub owner: String,
    pub public: bool,
    /// Media file ids in play order
    pub tracks: Vec<String>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Named scalar application setting (e.g. the last scan timestamp)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub value: String,
}
