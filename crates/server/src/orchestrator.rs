//! # Suggestion Engine Orchestrator
//!
//! Coordinates one training cycle end to end and serves suggestion requests
//! against the last fully-built cycle:
//! 1. Read the watchlist and fetch metadata per movie (once per cycle)
//! 2. Build the vocabulary and the movie-id enumeration
//! 3. Encode training pairs and fit a fresh model
//! 4. Persist the artifacts and swap them in atomically
//! 5. On suggest: source new releases, filter the watchlist, batch-score
//!
//! Retrain and scoring never race: scoring clones the current artifact Arc
//! under a read lock and works against that immutable value, while a retrain
//! builds its replacement completely before the write-lock swap.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use catalog::{MovieMetadata, WatchlistStore, SINGLE_USER_ID};
use model::{
    train, CycleArtifacts, ModelDims, SnapshotStore, SuggestionNet, TrainReport, TrainerConfig,
    TrainingExample,
};
use pipeline::{encode_all, rating, VocabularyBuilder};
use tmdb::MetadataProvider;

use crate::error::{EngineError, EngineResult};
use crate::scorer::{BatchScorer, ScoredMovie};

/// New-release pages sourced per suggestion request.
const NEW_RELEASE_PAGES: u32 = 2;

/// Knobs the engine needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub trainer: TrainerConfig,
    pub score_concurrency: usize,
    pub fetch_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trainer: TrainerConfig::default(),
            score_concurrency: 20,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome of one training cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    /// Watchlist movies enumerated this cycle
    pub movies: usize,
    /// Pairs that actually entered training
    pub training_examples: usize,
    /// Movies skipped because their metadata fetch failed
    pub skipped_metadata: usize,
    pub report: TrainReport,
}

/// Coordinates training cycles and suggestion requests.
pub struct SuggestionEngine {
    watchlist: Arc<dyn WatchlistStore>,
    provider: Arc<dyn MetadataProvider>,
    snapshots: Arc<dyn SnapshotStore>,
    scorer: BatchScorer,
    trainer_config: TrainerConfig,
    /// Last fully-built cycle; `None` until the first train or snapshot load
    artifacts: RwLock<Option<Arc<CycleArtifacts>>>,
    /// Serializes retrains; scoring is not blocked by an in-flight cycle
    retrain_gate: Mutex<()>,
}

impl SuggestionEngine {
    pub fn new(
        watchlist: Arc<dyn WatchlistStore>,
        provider: Arc<dyn MetadataProvider>,
        snapshots: Arc<dyn SnapshotStore>,
        config: EngineConfig,
    ) -> Self {
        let scorer = BatchScorer::new(
            provider.clone(),
            config.score_concurrency,
            config.fetch_timeout,
        );
        Self {
            watchlist,
            provider,
            snapshots,
            scorer,
            trainer_config: config.trainer,
            artifacts: RwLock::new(None),
            retrain_gate: Mutex::new(()),
        }
    }

    /// Make sure a model is available: reuse the live one, fall back to the
    /// snapshot, and as a last resort run a fresh training cycle.
    pub async fn ensure_ready(&self) -> EngineResult<()> {
        if self.artifacts.read().await.is_some() {
            return Ok(());
        }

        if self.snapshots.exists() {
            let artifacts = Arc::new(self.snapshots.load()?);
            info!(
                movies = artifacts.num_movies(),
                genres = artifacts.vocabulary.genres.len(),
                "Restored cycle artifacts from snapshot"
            );
            *self.artifacts.write().await = Some(artifacts);
            return Ok(());
        }

        self.retrain().await.map(|_| ())
    }

    /// Run a full training cycle and swap the resulting artifacts in.
    ///
    /// A training failure leaves both the live artifacts and the snapshot
    /// untouched; a half-trained model never replaces a good one.
    pub async fn retrain(&self) -> EngineResult<CycleSummary> {
        let _gate = self.retrain_gate.lock().await;

        let entries = self.watchlist.entries().await?;
        if entries.is_empty() {
            return Err(EngineError::EmptyWatchlist);
        }

        // One metadata pass feeds both the vocabulary and the training pairs
        let mut fetched: Vec<Option<MovieMetadata>> = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for entry in &entries {
            let metadata = match self.provider.fetch_metadata(entry.movie_id).await {
                Ok(Some(metadata)) => Some(metadata),
                Ok(None) => {
                    warn!(movie_id = entry.movie_id, "No metadata for watchlist movie");
                    None
                }
                Err(err) => {
                    warn!(
                        movie_id = entry.movie_id,
                        error = %err,
                        "Metadata fetch failed for watchlist movie"
                    );
                    None
                }
            };
            if metadata.is_none() {
                skipped += 1;
            }
            fetched.push(metadata);
        }

        let mut builder = VocabularyBuilder::new();
        for metadata in fetched.iter().flatten() {
            builder.add(metadata);
        }
        let vocabulary = builder.build();
        info!(
            movies = entries.len(),
            skipped,
            genres = vocabulary.genres.len(),
            actors = vocabulary.actors.len(),
            directors = vocabulary.directors.len(),
            "Built cycle vocabulary"
        );

        // Select the rows that enter training, then encode them as a batch
        let mut selected: Vec<(usize, Option<f32>)> = Vec::with_capacity(entries.len());
        let mut to_encode: Vec<MovieMetadata> = Vec::with_capacity(entries.len());
        for (movie_index, (entry, metadata)) in entries.iter().zip(fetched).enumerate() {
            let Some(metadata) = metadata else {
                continue;
            };
            let has_signal = matches!(entry.rating, Some(r) if r > 0.0);
            if !self.trainer_config.impute_missing_ratings && !has_signal {
                continue; // historical drop variant
            }
            selected.push((movie_index, entry.rating));
            to_encode.push(metadata);
        }

        let records = encode_all(&to_encode, &vocabulary);
        let examples: Vec<TrainingExample> = selected
            .into_iter()
            .zip(records)
            .map(|((movie_index, raw_rating), features)| TrainingExample {
                user_id: SINGLE_USER_ID,
                movie_index,
                target: rating::normalize(raw_rating),
                features,
            })
            .collect();

        let dims = ModelDims {
            num_movies: entries.len(),
            num_genres: vocabulary.genres.len(),
            num_actors: vocabulary.actors.len(),
            num_directors: vocabulary.directors.len(),
        };
        let mut rng = match self.trainer_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut net = SuggestionNet::new(dims, &mut rng);
        let report = train(&mut net, &examples, &self.trainer_config)?;

        let artifacts = Arc::new(CycleArtifacts {
            vocabulary,
            movie_ids: entries.iter().map(|e| e.movie_id).collect(),
            model: net,
        });
        self.snapshots.save(&artifacts)?;
        *self.artifacts.write().await = Some(artifacts.clone());

        info!(
            movies = artifacts.num_movies(),
            examples = report.examples,
            final_loss = report.final_loss,
            "Training cycle complete"
        );

        Ok(CycleSummary {
            movies: artifacts.num_movies(),
            training_examples: report.examples,
            skipped_metadata: skipped,
            report,
        })
    }

    /// Score current new releases against the last cycle and return them
    /// ranked by predicted rating.
    pub async fn suggest(&self) -> EngineResult<Vec<ScoredMovie>> {
        let artifacts = self
            .artifacts
            .read()
            .await
            .clone()
            .ok_or(EngineError::NotTrained)?;

        let mut candidates = Vec::new();
        for page in 1..=NEW_RELEASE_PAGES {
            candidates.extend(self.provider.fetch_new_releases(page).await?);
        }

        let watched: HashSet<_> = self.watchlist.movie_ids().await?.into_iter().collect();
        let fresh: Vec<_> = candidates
            .into_iter()
            .filter(|stub| !watched.contains(&stub.id))
            .collect();
        info!(candidates = fresh.len(), "Scoring new releases");

        self.scorer.score(fresh, artifacts).await
    }

    /// The artifacts currently serving suggestions, if any.
    pub async fn current_artifacts(&self) -> Option<Arc<CycleArtifacts>> {
        self.artifacts.read().await.clone()
    }
}
