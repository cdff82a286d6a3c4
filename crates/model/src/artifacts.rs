//! Immutable artifact set produced by one training cycle.
//!
//! A cycle produces a vocabulary, a movie-id enumeration, and a model fitted
//! against both. The three are only meaningful together (index 5 of the
//! actor list and row 5 of the movie table mean nothing outside their
//! cycle), so they travel, swap, and persist as one value.

use catalog::{MovieId, SINGLE_USER_ID};
use pipeline::{FeatureRecord, Vocabulary};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::net::SuggestionNet;

/// Everything one training cycle produced. Never mutated in place; a retrain
/// replaces the whole value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleArtifacts {
    pub vocabulary: Vocabulary,
    /// The cycle's movie-id enumeration; a movie's position here is its
    /// embedding row
    pub movie_ids: Vec<MovieId>,
    pub model: SuggestionNet,
}

impl CycleArtifacts {
    pub fn num_movies(&self) -> usize {
        self.movie_ids.len()
    }

    /// Score a candidate that was not part of training, using the reserved
    /// embedding row and the single implicit user. Returns the normalized
    /// prediction in [0, 1].
    pub fn predict_unseen(&self, features: &FeatureRecord) -> Result<f32, ModelError> {
        self.model
            .predict(SINGLE_USER_ID, self.model.unseen_movie_index(), features)
    }
}
