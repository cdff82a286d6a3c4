//! Feature encoding for movie metadata.
//!
//! This module turns one movie's raw metadata plus the cycle vocabulary into
//! the fixed-shape [`FeatureRecord`] the model consumes: three multi-hot
//! vectors sized by the vocabulary lists, and four numeric scalars passed
//! through unscaled.
//!
//! Values absent from the vocabulary (a new release with a genre the
//! watchlist never saw) encode as silence: zeros at every position, never an
//! error. The model sees nothing, which is the correct signal for "outside
//! the known universe".

use catalog::MovieMetadata;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::vocabulary::Vocabulary;

/// Fixed-shape feature record for one movie within one training cycle.
///
/// Vector lengths are dictated by the cycle's vocabulary; records from
/// different cycles are not interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub genre_vector: Vec<f32>,
    pub actor_vector: Vec<f32>,
    pub director_vector: Vec<f32>,
    pub release_year: f32,
    pub duration: f32,
    pub popularity: f32,
    pub average_rating: f32,
}

/// Encode one movie's metadata against the cycle vocabulary.
///
/// Deterministic: identical inputs produce bit-identical records. Missing
/// numeric fields default to 0. Scalars are passed through unscaled; the
/// dense layer is expected to learn appropriate weighting.
pub fn encode(metadata: &MovieMetadata, vocabulary: &Vocabulary) -> FeatureRecord {
    FeatureRecord {
        genre_vector: multi_hot(&metadata.genres, &vocabulary.genres),
        actor_vector: multi_hot(&metadata.actors, &vocabulary.actors),
        director_vector: multi_hot(&metadata.directors, &vocabulary.directors),
        release_year: metadata.release_year.unwrap_or(0) as f32,
        duration: metadata.duration.unwrap_or(0) as f32,
        popularity: metadata.popularity.unwrap_or(0.0),
        average_rating: metadata.average_rating.unwrap_or(0.0),
    }
}

/// Encode a batch of metadata snapshots in parallel, preserving order.
pub fn encode_all(metadata: &[MovieMetadata], vocabulary: &Vocabulary) -> Vec<FeatureRecord> {
    let records: Vec<FeatureRecord> = metadata
        .par_iter()
        .map(|m| encode(m, vocabulary))
        .collect();
    tracing::debug!(records = records.len(), "Encoded feature batch");
    records
}

/// Build a multi-hot indicator vector over a sorted vocabulary list.
///
/// Relies on the vocabulary's sorted invariant for lookup; unknown values
/// contribute nothing.
fn multi_hot(values: &[String], vocabulary: &[String]) -> Vec<f32> {
    let mut vector = vec![0.0; vocabulary.len()];
    for value in values {
        if let Ok(index) = vocabulary.binary_search(value) {
            vector[index] = 1.0;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_vocabulary() -> Vocabulary {
        Vocabulary {
            genres: vec!["action".to_string(), "drama".to_string()],
            actors: vec!["Ana".to_string(), "Ben".to_string(), "Cy".to_string()],
            directors: vec!["Kurosawa".to_string()],
        }
    }

    #[test]
    fn test_multi_hot_marks_known_positions() {
        let vocab = test_vocabulary();
        let meta = MovieMetadata {
            genres: vec!["drama".to_string()],
            actors: vec!["Cy".to_string(), "Ana".to_string()],
            ..Default::default()
        };

        let record = encode(&meta, &vocab);
        assert_eq!(record.genre_vector, vec![0.0, 1.0]);
        assert_eq!(record.actor_vector, vec![1.0, 0.0, 1.0]);
        assert_eq!(record.director_vector, vec![0.0]);
    }

    #[test]
    fn test_unknown_values_encode_as_silence() {
        let vocab = test_vocabulary();
        let meta = MovieMetadata {
            genres: vec!["scifi".to_string()],
            actors: vec!["Zelda".to_string()],
            directors: vec!["Unknown".to_string()],
            ..Default::default()
        };

        let record = encode(&meta, &vocab);
        assert_eq!(record.genre_vector, vec![0.0, 0.0]);
        assert_eq!(record.actor_vector, vec![0.0, 0.0, 0.0]);
        assert_eq!(record.director_vector, vec![0.0]);
    }

    #[test]
    fn test_missing_numerics_default_to_zero() {
        let vocab = test_vocabulary();
        let record = encode(&MovieMetadata::default(), &vocab);

        assert_eq!(record.release_year, 0.0);
        assert_eq!(record.duration, 0.0);
        assert_eq!(record.popularity, 0.0);
        assert_eq!(record.average_rating, 0.0);
    }

    #[test]
    fn test_numerics_pass_through_unscaled() {
        let vocab = test_vocabulary();
        let meta = MovieMetadata {
            release_year: Some(1985),
            duration: Some(116),
            popularity: Some(42.7),
            average_rating: Some(7.9),
            ..Default::default()
        };

        let record = encode(&meta, &vocab);
        assert_eq!(record.release_year, 1985.0);
        assert_eq!(record.duration, 116.0);
        assert_eq!(record.popularity, 42.7);
        assert_eq!(record.average_rating, 7.9);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let vocab = test_vocabulary();
        let meta = MovieMetadata {
            genres: vec!["action".to_string(), "drama".to_string()],
            actors: vec!["Ben".to_string()],
            release_year: Some(2001),
            ..Default::default()
        };

        assert_eq!(encode(&meta, &vocab), encode(&meta, &vocab));
    }

    #[test]
    fn test_encode_all_preserves_order() {
        let vocab = test_vocabulary();
        let batch = vec![
            MovieMetadata {
                genres: vec!["action".to_string()],
                ..Default::default()
            },
            MovieMetadata {
                genres: vec!["drama".to_string()],
                ..Default::default()
            },
        ];

        let records = encode_all(&batch, &vocab);
        assert_eq!(records[0].genre_vector, vec![1.0, 0.0]);
        assert_eq!(records[1].genre_vector, vec![0.0, 1.0]);
    }
}
