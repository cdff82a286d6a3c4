//! HTTP shell for the suggestion engine.
//!
//! Three routes, mirroring the service's external contract:
//! - `GET /version`: build identifier
//! - `GET /train`: run a training cycle, swap artifacts on success
//! - `GET /suggestions`: ranked new releases from the last trained cycle

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::EngineResult;
use crate::orchestrator::SuggestionEngine;
use crate::scorer::ScoredMovie;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SuggestionEngine>,
}

impl AppState {
    pub fn new(engine: Arc<SuggestionEngine>) -> Self {
        Self { engine }
    }
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version))
        .route("/train", get(train))
        .route("/suggestions", get(suggestions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn version() -> Json<Value> {
    Json(json!({ "version": "1.0" }))
}

async fn train(State(state): State<AppState>) -> EngineResult<Json<Value>> {
    let summary = state.engine.retrain().await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Training completed",
        "movies": summary.movies,
        "training_examples": summary.training_examples,
        "skipped_metadata": summary.skipped_metadata,
        "final_loss": summary.report.final_loss,
    })))
}

async fn suggestions(State(state): State<AppState>) -> EngineResult<Json<Vec<ScoredMovie>>> {
    let ranked = state.engine.suggest().await?;
    Ok(Json(ranked))
}
