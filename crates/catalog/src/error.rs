//! Error types for watchlist storage.

use thiserror::Error;

/// Errors that can occur while reading the watchlist store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying database failure (connection, query, decode)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row was present but could not be interpreted
    #[error("invalid watchlist row: {0}")]
    InvalidRow(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
