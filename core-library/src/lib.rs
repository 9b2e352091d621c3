//! # Library Management Module
//!
//! Owns the media catalog and provides repository patterns for data access.
//!
//! ## Overview
//!
//! This module manages:
//! - Catalog models (media files, albums, artists, playlists, properties)
//! - The mapping of each model onto individually stored fields, secondary
//!   indexes and parent/child collections in a `core-store` engine
//! - Repository patterns with sorting, pagination and range queries
//! - Reconciling the catalog with library scans (import and purge) and
//!   rebuilding the artist index

pub mod codec;
pub mod error;
pub mod import;
pub mod indexing;
pub mod keys;
pub mod models;
pub mod persistence;
pub mod query;
pub mod repositories;

pub use codec::{Entity, EntityCodec, ScalarKind, ScalarValue};
pub use error::{LibraryError, Result};
pub use import::{ImportSummary, Importer, LibraryScanner, LibrarySnapshot};
pub use indexing::{ArtistIndexer, IndexGroups};
pub use models::{Album, Artist, ArtistIndex, ArtistInfo, MediaFile, Playlist, Property};
pub use persistence::Persistence;
pub use query::QueryOptions;
