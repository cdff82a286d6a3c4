//! The metadata provider trait and its error type.

use async_trait::async_trait;
use catalog::{MovieId, MovieMetadata, MovieStub};
use thiserror::Error;

/// Errors that can occur when talking to the metadata service
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata api returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ProviderError>;

/// External source of movie metadata and new-release listings.
///
/// ## Design Note
/// `fetch_metadata` distinguishes "the movie does not exist" (`Ok(None)`)
/// from transport/service failures (`Err`). Callers absorb both the same
/// way for a single movie (skip it and keep going), but the distinction
/// matters for logging and retry decisions.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the full metadata snapshot for one movie.
    async fn fetch_metadata(&self, movie_id: MovieId) -> Result<Option<MovieMetadata>>;

    /// Fetch one page of newly released movies (pages are 1-based).
    async fn fetch_new_releases(&self, page: u32) -> Result<Vec<MovieStub>>;
}
