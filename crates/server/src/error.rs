//! Engine-level errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures surfaced by the suggestion engine.
///
/// The first two variants are rejected-request conditions (the caller asked
/// for something the current state cannot serve); the rest wrap collaborator
/// failures. Model shape mismatches ride in via `Model` and map to 500;
/// they indicate a broken cycle pairing, not bad input.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("watchlist is empty; nothing to train on")]
    EmptyWatchlist,

    #[error("no trained model available; run a training cycle first")]
    NotTrained,

    #[error("watchlist store error: {0}")]
    Store(#[from] catalog::StoreError),

    #[error("metadata provider error: {0}")]
    Provider(#[from] tmdb::ProviderError),

    #[error("model error: {0}")]
    Model(#[from] model::ModelError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] model::SnapshotError),
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::EmptyWatchlist => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::NotTrained => StatusCode::CONFLICT,
            EngineError::Provider(_) => StatusCode::BAD_GATEWAY,
            EngineError::Store(_) | EngineError::Model(_) | EngineError::Snapshot(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results in this crate
pub type EngineResult<T> = Result<T, EngineError>;
