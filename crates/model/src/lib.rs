//! # Model Crate
//!
//! The rating-prediction model for the movie suggestion engine.
//!
//! ## Components
//!
//! - **net**: [`SuggestionNet`], embeddings + one hidden layer + sigmoid
//! - **trainer**: mini-batch SGD fitting against normalized watchlist ratings
//! - **artifacts**: [`CycleArtifacts`], the immutable per-cycle value object
//!   (vocabulary + movie enumeration + fitted model)
//! - **snapshot**: file and in-memory persistence of cycle artifacts
//! - **error**: typed failures; shape mismatches are loud contract violations
//!
//! ## Example Usage
//!
//! ```ignore
//! use model::{train, ModelDims, SuggestionNet, TrainerConfig};
//!
//! let mut net = SuggestionNet::new(dims, &mut rng);
//! let report = train(&mut net, &examples, &TrainerConfig::default())?;
//! tracing::info!(loss = report.final_loss, "cycle fitted");
//! ```

pub mod artifacts;
pub mod error;
pub mod net;
pub mod snapshot;
pub mod trainer;

// Re-export main types
pub use artifacts::CycleArtifacts;
pub use error::{ModelError, SnapshotError};
pub use net::{ModelDims, SuggestionNet};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use trainer::{train, TrainReport, TrainerConfig, TrainingExample};
