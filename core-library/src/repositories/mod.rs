//! # Repository Pattern Implementation
//!
//! This module provides repository traits and implementations for catalog
//! data access on top of a [`KvStore`](core_store::KvStore).
//!
//! ## Architecture
//!
//! - [`KvRepository`] implements storage, listing and purge once for every
//!   [`Entity`](crate::codec::Entity)
//! - Each catalog entity has an `async_trait` repository trait and a `Kv*`
//!   implementation that declares the entity's fields, indexes and parent
//!   relation and adds typed queries
//! - All operations return `Result<T>` for error handling
//!
//! ## Available Repositories
//!
//! - `MediaFileRepository` - Audio files, children of albums
//! - `AlbumRepository` - Albums, children of artists
//! - `ArtistRepository` - Music artists
//! - `ArtistIndexRepository` - Artists grouped by initial for browsing
//! - `PlaylistRepository` - Playlists with ordered track ids
//! - `PropertyRepository` - Named string settings

pub mod album;
pub mod artist;
pub mod artist_index;
pub mod generic;
pub mod media_file;
pub mod playlist;
pub mod property;

pub use album::{AlbumRepository, KvAlbumRepository};
pub use artist::{ArtistRepository, KvArtistRepository};
pub use artist_index::{ArtistIndexRepository, KvArtistIndexRepository};
pub use generic::KvRepository;
pub use media_file::{KvMediaFileRepository, MediaFileRepository};
pub use playlist::{KvPlaylistRepository, PlaylistRepository};
pub use property::{KvPropertyRepository, PropertyRepository};
