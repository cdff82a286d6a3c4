//! Core domain types shared across the suggestion engine.
//!
//! This module defines the fundamental data structures used throughout the
//! system: watchlist rows, the metadata snapshot fetched per movie, and the
//! lightweight stubs that new-release listings produce.

use serde::{Deserialize, Serialize};

/// Unique identifier for a movie (TMDB id space)
pub type MovieId = u32;

/// The engine serves exactly one implicit user. Keeping the id as a named
/// constant makes a future multi-user extension a visible interface change
/// rather than a silent behavior change.
pub const SINGLE_USER_ID: u32 = 0;

/// One row of the user's watchlist.
///
/// `rating` is `None` when the movie was added but never rated; how such rows
/// enter training is a normalizer policy decision, not a store concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub movie_id: MovieId,
    /// Raw rating in [0, 5], if the user rated the movie
    pub rating: Option<f32>,
}

impl WatchlistEntry {
    pub fn new(movie_id: MovieId, rating: Option<f32>) -> Self {
        Self { movie_id, rating }
    }
}

/// Metadata snapshot for a single movie, as returned by the metadata
/// provider. Treated as immutable for the duration of one training or
/// scoring cycle.
///
/// The numeric fields are optional because upstream records are frequently
/// incomplete; the feature encoder defaults missing values to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieMetadata {
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub release_year: Option<i32>,
    /// Runtime in minutes
    pub duration: Option<u32>,
    pub popularity: Option<f32>,
    pub average_rating: Option<f32>,
}

/// A candidate movie sourced from a new-release listing.
///
/// Stubs carry only what the listing endpoint returns; full metadata is
/// fetched per id when the candidate is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieStub {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watchlist_entry_roundtrip() {
        let entry = WatchlistEntry::new(42, Some(4.5));
        assert_eq!(entry.movie_id, 42);
        assert_eq!(entry.rating, Some(4.5));

        let unrated = WatchlistEntry::new(43, None);
        assert!(unrated.rating.is_none());
    }

    #[test]
    fn test_metadata_defaults_are_empty() {
        let meta = MovieMetadata::default();
        assert!(meta.genres.is_empty());
        assert!(meta.actors.is_empty());
        assert!(meta.directors.is_empty());
        assert!(meta.release_year.is_none());
        assert!(meta.duration.is_none());
    }
}
