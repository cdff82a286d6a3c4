//! In-memory metadata provider for tests and offline development.

use async_trait::async_trait;
use catalog::{MovieId, MovieMetadata, MovieStub};
use std::collections::HashMap;

use crate::provider::{MetadataProvider, Result};

/// Fixture provider backed by hash maps.
///
/// Movies not registered with [`with_movie`](Self::with_movie) behave like
/// not-found lookups (`Ok(None)`), which is exactly how partial metadata
/// failures surface to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataProvider {
    movies: HashMap<MovieId, MovieMetadata>,
    pages: HashMap<u32, Vec<MovieStub>>,
}

impl MemoryMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata for a movie id (builder pattern).
    pub fn with_movie(mut self, movie_id: MovieId, metadata: MovieMetadata) -> Self {
        self.movies.insert(movie_id, metadata);
        self
    }

    /// Register one page of new releases (pages are 1-based).
    pub fn with_page(mut self, page: u32, stubs: Vec<MovieStub>) -> Self {
        self.pages.insert(page, stubs);
        self
    }
}

#[async_trait]
impl MetadataProvider for MemoryMetadataProvider {
    async fn fetch_metadata(&self, movie_id: MovieId) -> Result<Option<MovieMetadata>> {
        Ok(self.movies.get(&movie_id).cloned())
    }

    async fn fetch_new_releases(&self, page: u32) -> Result<Vec<MovieStub>> {
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_movie_is_none() {
        let provider = MemoryMetadataProvider::new();
        assert!(provider.fetch_metadata(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_registered_movie_is_returned() {
        let meta = MovieMetadata {
            genres: vec!["Drama".to_string()],
            ..Default::default()
        };
        let provider = MemoryMetadataProvider::new().with_movie(7, meta.clone());

        let fetched = provider.fetch_metadata(7).await.unwrap();
        assert_eq!(fetched, Some(meta));
    }

    #[tokio::test]
    async fn test_missing_page_is_empty() {
        let provider = MemoryMetadataProvider::new().with_page(
            1,
            vec![MovieStub {
                id: 1,
                title: "First".to_string(),
                release_date: None,
            }],
        );

        assert_eq!(provider.fetch_new_releases(1).await.unwrap().len(), 1);
        assert!(provider.fetch_new_releases(2).await.unwrap().is_empty());
    }
}
