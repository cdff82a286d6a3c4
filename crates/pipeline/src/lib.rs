//! Preprocessing pipeline for the movie suggestion engine.
//!
//! This crate provides:
//! - VocabularyBuilder for deriving sorted categorical universes
//! - Feature encoding into fixed-shape records
//! - Rating normalization into [0, 1] training targets
//!
//! ## Architecture
//! One training cycle flows through these stages:
//! 1. VocabularyBuilder folds every watchlist movie's metadata into sorted
//!    genre/actor/director lists
//! 2. `encode` maps each movie's metadata + vocabulary into a FeatureRecord
//! 3. `rating::normalize` maps raw watchlist ratings into training targets
//!
//! The same vocabulary and encoder feed both training and batch scoring, so
//! index assignment stays consistent within a cycle.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{encode, rating, VocabularyBuilder};
//!
//! let mut builder = VocabularyBuilder::new();
//! for meta in &fetched_metadata {
//!     builder.add(meta);
//! }
//! let vocabulary = builder.build();
//!
//! let record = encode(&fetched_metadata[0], &vocabulary);
//! let target = rating::normalize(Some(4.0));
//! ```

pub mod features;
pub mod rating;
pub mod vocabulary;

// Re-export main types
pub use features::{encode, encode_all, FeatureRecord};
pub use rating::{normalize, MAX_RATING, NEUTRAL_TARGET};
pub use vocabulary::{Vocabulary, VocabularyBuilder};
