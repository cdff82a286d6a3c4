//! Vocabulary construction for categorical movie features.
//!
//! The vocabulary is the sorted, deduplicated universe of genres, actors and
//! directors observed across the watchlist in one training cycle. Sorting is
//! lexicographic, so index assignment is deterministic: position 5 of the
//! actor list means the same actor for every feature record built in the
//! same cycle, and rebuilding from identical metadata yields identical lists.
//!
//! A vocabulary is only meaningful together with the model trained against
//! it; rebuilds replace it wholesale, never merge.

use catalog::MovieMetadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sorted, deduplicated categorical universes for one training cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
}

impl Vocabulary {
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.actors.is_empty() && self.directors.is_empty()
    }
}

/// Accumulates the union of categorical values across movie metadata.
///
/// `BTreeSet` keeps the accumulation deduplicated and ordered, so `build`
/// is a plain collect with no separate sort step.
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    genres: BTreeSet<String>,
    actors: BTreeSet<String>,
    directors: BTreeSet<String>,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one movie's metadata into the accumulating sets.
    ///
    /// Movies whose metadata fetch failed are simply never added; that is
    /// the whole partial-failure story at this layer.
    pub fn add(&mut self, metadata: &MovieMetadata) {
        self.genres.extend(metadata.genres.iter().cloned());
        self.actors.extend(metadata.actors.iter().cloned());
        self.directors.extend(metadata.directors.iter().cloned());
    }

    /// Finalize into sorted lists.
    pub fn build(self) -> Vocabulary {
        Vocabulary {
            genres: self.genres.into_iter().collect(),
            actors: self.actors.into_iter().collect(),
            directors: self.directors.into_iter().collect(),
        }
    }
}
