//! Concurrent batch scoring of candidate movies.
//!
//! Each candidate is an independent task: one metadata fetch (blocking I/O,
//! bounded by a timeout) followed by one read-only model inference. Tasks
//! share nothing mutable, so no locking is involved; a semaphore caps the
//! fan-out. The ranked output is produced by a deterministic sort after all
//! tasks complete, so completion order never leaks into the result.

use std::sync::Arc;
use std::time::Duration;

use catalog::{MovieId, MovieStub};
use model::{CycleArtifacts, ModelError};
use serde::Serialize;
use tmdb::MetadataProvider;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::EngineResult;

/// One ranked suggestion, with the prediction rescaled to the raw [0, 5]
/// rating scale.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMovie {
    pub id: MovieId,
    pub title: String,
    pub release_date: Option<String>,
    pub predicted_rating: f32,
}

/// Scores candidate batches against a cycle's artifacts.
pub struct BatchScorer {
    provider: Arc<dyn MetadataProvider>,
    concurrency: usize,
    fetch_timeout: Duration,
}

impl BatchScorer {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        concurrency: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
            fetch_timeout,
        }
    }

    /// Score every candidate and return them sorted by predicted rating,
    /// highest first. Ties keep the original candidate order, so a fixed
    /// candidate set and fixed parameters always rank identically.
    ///
    /// Candidates whose metadata fetch fails or times out are dropped from
    /// the output. A shape mismatch aborts the whole batch: it means the
    /// artifacts are broken, and every remaining score would be garbage too.
    pub async fn score(
        &self,
        candidates: Vec<MovieStub>,
        artifacts: Arc<CycleArtifacts>,
    ) -> EngineResult<Vec<ScoredMovie>> {
        let total = candidates.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Result<Option<(usize, ScoredMovie)>, ModelError>> = JoinSet::new();

        for (position, stub) in candidates.into_iter().enumerate() {
            let provider = self.provider.clone();
            let artifacts = artifacts.clone();
            let semaphore = semaphore.clone();
            let fetch_timeout = self.fetch_timeout;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Ok(None), // pool shut down mid-batch
                };

                let metadata = match timeout(fetch_timeout, provider.fetch_metadata(stub.id)).await
                {
                    Err(_) => {
                        warn!(movie_id = stub.id, "Metadata fetch timed out, dropping candidate");
                        return Ok(None);
                    }
                    Ok(Err(err)) => {
                        warn!(
                            movie_id = stub.id,
                            error = %err,
                            "Metadata fetch failed, dropping candidate"
                        );
                        return Ok(None);
                    }
                    Ok(Ok(None)) => {
                        warn!(movie_id = stub.id, "No metadata for candidate, dropping");
                        return Ok(None);
                    }
                    Ok(Ok(Some(metadata))) => metadata,
                };

                let record = pipeline::encode(&metadata, &artifacts.vocabulary);
                let normalized = artifacts.predict_unseen(&record)?;

                Ok(Some((
                    position,
                    ScoredMovie {
                        id: stub.id,
                        title: stub.title,
                        release_date: stub.release_date,
                        predicted_rating: normalized * pipeline::MAX_RATING,
                    },
                )))
            });
        }

        let mut scored: Vec<(usize, ScoredMovie)> = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(Some(entry))) => scored.push(entry),
                Ok(Ok(None)) => {}
                Ok(Err(model_err)) => return Err(model_err.into()),
                Err(join_err) => {
                    warn!(error = %join_err, "Scoring task panicked, dropping candidate");
                }
            }
        }

        scored.sort_by(|a, b| {
            b.1.predicted_rating
                .partial_cmp(&a.1.predicted_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        info!(
            scored = scored.len(),
            dropped = total - scored.len(),
            "Batch scoring complete"
        );

        Ok(scored.into_iter().map(|(_, movie)| movie).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::MovieMetadata;
    use model::{ModelDims, SuggestionNet};
    use pipeline::Vocabulary;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tmdb::MemoryMetadataProvider;

    fn stub(id: MovieId, title: &str) -> MovieStub {
        MovieStub {
            id,
            title: title.to_string(),
            release_date: None,
        }
    }

    fn meta(genres: &[&str]) -> MovieMetadata {
        MovieMetadata {
            genres: genres.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn test_artifacts() -> Arc<CycleArtifacts> {
        let vocabulary = Vocabulary {
            genres: vec!["action".to_string(), "drama".to_string()],
            actors: vec![],
            directors: vec![],
        };
        let dims = ModelDims {
            num_movies: 2,
            num_genres: 2,
            num_actors: 0,
            num_directors: 0,
        };
        let mut rng = StdRng::seed_from_u64(99);
        Arc::new(CycleArtifacts {
            vocabulary,
            movie_ids: vec![1, 2],
            model: SuggestionNet::new(dims, &mut rng),
        })
    }

    fn scorer(provider: MemoryMetadataProvider) -> BatchScorer {
        BatchScorer::new(Arc::new(provider), 8, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_output_is_sorted_descending() {
        let provider = MemoryMetadataProvider::new()
            .with_movie(10, meta(&["action"]))
            .with_movie(11, meta(&["drama"]))
            .with_movie(12, meta(&["action", "drama"]));
        let candidates = vec![stub(10, "A"), stub(11, "B"), stub(12, "C")];

        let ranked = scorer(provider)
            .score(candidates, test_artifacts())
            .await
            .unwrap();

        assert_eq!(ranked.len(), 3);
        for pair in ranked.windows(2) {
            assert!(pair[0].predicted_rating >= pair[1].predicted_rating);
        }
        for movie in &ranked {
            assert!((0.0..=5.0).contains(&movie.predicted_rating));
        }
    }

    #[tokio::test]
    async fn test_ranking_is_stable_across_runs() {
        let provider = MemoryMetadataProvider::new()
            .with_movie(10, meta(&["action"]))
            .with_movie(11, meta(&["drama"]))
            .with_movie(12, meta(&["action", "drama"]));
        let artifacts = test_artifacts();
        let candidates = || vec![stub(10, "A"), stub(11, "B"), stub(12, "C")];

        let scorer = scorer(provider);
        let first = scorer.score(candidates(), artifacts.clone()).await.unwrap();
        let second = scorer.score(candidates(), artifacts).await.unwrap();

        let ids = |v: &[ScoredMovie]| v.iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_ties_keep_candidate_order() {
        // Identical metadata produces identical predictions
        let provider = MemoryMetadataProvider::new()
            .with_movie(21, meta(&["drama"]))
            .with_movie(22, meta(&["drama"]))
            .with_movie(23, meta(&["drama"]));
        let candidates = vec![stub(21, "first"), stub(22, "second"), stub(23, "third")];

        let ranked = scorer(provider)
            .score(candidates, test_artifacts())
            .await
            .unwrap();

        assert_eq!(
            ranked.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![21, 22, 23]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_drops_only_that_candidate() {
        // Movie 31 is never registered, so its fetch resolves to not-found
        let provider = MemoryMetadataProvider::new()
            .with_movie(30, meta(&["action"]))
            .with_movie(32, meta(&["drama"]));
        let candidates = vec![stub(30, "A"), stub(31, "missing"), stub(32, "C")];

        let ranked = scorer(provider)
            .score(candidates, test_artifacts())
            .await
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|m| m.id != 31));
    }

    #[tokio::test]
    async fn test_candidates_score_through_the_reserved_slot() {
        let unknown_genre = meta(&["comedy"]);
        let provider = MemoryMetadataProvider::new().with_movie(40, unknown_genre.clone());
        let artifacts = test_artifacts();

        let ranked = scorer(provider)
            .score(vec![stub(40, "new release")], artifacts.clone())
            .await
            .unwrap();

        // The scorer must produce exactly the reserved-slot prediction
        let record = pipeline::encode(&unknown_genre, &artifacts.vocabulary);
        let expected = artifacts.predict_unseen(&record).unwrap() * pipeline::MAX_RATING;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].predicted_rating, expected);
    }

    #[tokio::test]
    async fn test_empty_candidate_batch() {
        let ranked = scorer(MemoryMetadataProvider::new())
            .score(vec![], test_artifacts())
            .await
            .unwrap();
        assert!(ranked.is_empty());
    }
}
