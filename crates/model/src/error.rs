//! Error types for the model crate.

use thiserror::Error;

/// Errors from model construction, inference, and training.
///
/// `ShapeMismatch` and the index variants are contract violations: a feature
/// record or index built against one cycle's vocabulary reached a model
/// trained in another cycle. They are surfaced as errors so the service
/// shell can reject the request loudly instead of serving garbage scores.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error(
        "feature '{field}' has length {found} but the model expects {expected}; \
         the record was encoded against a different cycle's vocabulary"
    )]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("movie index {index} out of range for an embedding table of {rows} rows")]
    MovieIndexOutOfRange { index: usize, rows: usize },

    #[error("user id {0} unknown to the user embedding table")]
    UnknownUser(u32),

    /// Numerical instability or optimizer failure during fitting. A model
    /// that produced this must never replace a good snapshot.
    #[error("training failed: {0}")]
    Training(String),
}

/// Errors from snapshot persistence.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no snapshot present")]
    Missing,
}
