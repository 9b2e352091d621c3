use core_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Failed to decode {table}.{field}: {source}")]
    Decode {
        table: String,
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode {table}.{field}: {source}")]
    Encode {
        table: String,
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid entity descriptor for {table}: {message}")]
    Descriptor { table: String, message: String },

    #[error("Purge of {table} aborted after removing {} record(s): {source}", .removed.len())]
    Purge {
        table: String,
        removed: Vec<String>,
        #[source]
        source: Box<LibraryError>,
    },

    #[error("Library scan failed: {0}")]
    Scan(String),
}

impl LibraryError {
    pub(crate) fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error means the requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Ids already removed when a purge or remove call was aborted
    pub fn removed_so_far(&self) -> &[String] {
        match self {
            Self::Purge { removed, .. } => removed,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
