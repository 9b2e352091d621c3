use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Sort value under {key} is not numeric: {value}")]
    NonNumericSortValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
