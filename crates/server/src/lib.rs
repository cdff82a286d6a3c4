//! Server crate for the movie suggestion engine.
//!
//! Contains the orchestrator that coordinates training cycles and suggestion
//! requests, the concurrent batch scorer, the HTTP shell, and environment
//! configuration.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod routes;
pub mod scorer;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{CycleSummary, EngineConfig, SuggestionEngine};
pub use routes::{create_router, AppState};
pub use scorer::{BatchScorer, ScoredMovie};
