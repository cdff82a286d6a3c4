//! Mini-batch SGD training for [`SuggestionNet`].
//!
//! The trainer minimizes squared error between the sigmoid output and the
//! normalized rating targets over several epochs of shuffled mini-batches.
//! It is sequential by design; only batch scoring is concurrent.
//!
//! Training is stochastic: callers (and tests) should assert on the loss
//! trend, not exact outputs. A fixed `seed` makes runs reproducible.

use ndarray::{s, Array1, Array2, Axis};
use pipeline::FeatureRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::ModelError;
use crate::net::{SuggestionNet, HIDDEN_DIM, MOVIE_EMBED_DIM, USER_EMBED_DIM};

/// Tunable hyperparameters. None of these are contractual; the defaults are
/// sized for single-user watchlists (tens to low hundreds of rows).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// `true`: unrated watchlist rows train against the neutral 0.5 target.
    /// `false`: the historical variant that drops them entirely.
    pub impute_missing_ratings: bool,
    /// Fix the shuffle/init RNG for reproducible runs
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 40,
            batch_size: 16,
            learning_rate: 0.1,
            impute_missing_ratings: true,
            seed: None,
        }
    }
}

/// One (user, movie, target) pair with its encoded features.
#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub user_id: u32,
    /// Position of the movie in the cycle's movie-id enumeration
    pub movie_index: usize,
    /// Normalized rating in [0, 1]
    pub target: f32,
    pub features: FeatureRecord,
}

/// Summary of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub examples: usize,
    pub epochs: usize,
    pub initial_loss: f32,
    pub final_loss: f32,
}

/// Fit the network against the training pairs.
///
/// Zero examples is a well-defined no-op (the degenerate empty-watchlist
/// case); shape mismatches fail before any parameter is touched; a
/// non-finite epoch loss aborts with [`ModelError::Training`] so a diverged
/// model never reaches the snapshot store.
pub fn train(
    net: &mut SuggestionNet,
    examples: &[TrainingExample],
    config: &TrainerConfig,
) -> Result<TrainReport, ModelError> {
    if examples.is_empty() {
        warn!("Training requested with zero examples; leaving model untouched");
        return Ok(TrainReport {
            examples: 0,
            epochs: 0,
            initial_loss: 0.0,
            final_loss: 0.0,
        });
    }

    // Validate every pair up front so a foreign-cycle record cannot corrupt
    // a half-trained model.
    for example in examples {
        net.check(example.user_id, example.movie_index, &example.features)?;
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let batch_size = config.batch_size.max(1);
    let mut order: Vec<usize> = (0..examples.len()).collect();
    let mut initial_loss = 0.0;
    let mut final_loss = 0.0;

    for epoch in 0..config.epochs {
        order.shuffle(&mut rng);
        let mut epoch_loss = 0.0;

        for batch in order.chunks(batch_size) {
            let mut grads = BatchGrads::new(net);
            for &i in batch {
                epoch_loss += grads.accumulate(net, &examples[i])?;
            }
            grads.apply(net, config.learning_rate / batch.len() as f32);
        }

        epoch_loss /= examples.len() as f32;
        if !epoch_loss.is_finite() {
            return Err(ModelError::Training(format!(
                "loss diverged to {} at epoch {}",
                epoch_loss, epoch
            )));
        }

        if epoch == 0 {
            initial_loss = epoch_loss;
        }
        final_loss = epoch_loss;
        debug!(epoch, loss = epoch_loss, "Completed training epoch");
    }

    info!(
        examples = examples.len(),
        epochs = config.epochs,
        initial_loss,
        final_loss,
        "Training finished"
    );

    Ok(TrainReport {
        examples: examples.len(),
        epochs: config.epochs,
        initial_loss,
        final_loss,
    })
}

/// Gradient accumulator for one mini-batch.
///
/// Only the embedding rows actually touched by the batch are tracked, so the
/// movie-table gradient stays sparse.
struct BatchGrads {
    user: Array1<f32>,
    movie_rows: HashMap<usize, Array1<f32>>,
    hidden_weight: Array2<f32>,
    hidden_bias: Array1<f32>,
    output_weight: Array1<f32>,
    output_bias: f32,
}

impl BatchGrads {
    fn new(net: &SuggestionNet) -> Self {
        Self {
            user: Array1::zeros(USER_EMBED_DIM),
            movie_rows: HashMap::new(),
            hidden_weight: Array2::zeros((HIDDEN_DIM, net.dims().input_width())),
            hidden_bias: Array1::zeros(HIDDEN_DIM),
            output_weight: Array1::zeros(HIDDEN_DIM),
            output_bias: 0.0,
        }
    }

    /// Forward + backward for one example; returns its squared-error loss.
    fn accumulate(
        &mut self,
        net: &SuggestionNet,
        example: &TrainingExample,
    ) -> Result<f32, ModelError> {
        let pass = net.forward(example.user_id, example.movie_index, &example.features)?;

        let y = pass.output;
        let loss = (y - example.target).powi(2);

        // d(loss)/d(pre-sigmoid) = 2 (y - t) * sigmoid'(z)
        let dz = 2.0 * (y - example.target) * y * (1.0 - y);

        self.output_weight.scaled_add(dz, &pass.hidden);
        self.output_bias += dz;

        // Backprop through the ReLU hidden layer
        let mut dh = &net.output_weight * dz;
        dh.zip_mut_with(&pass.hidden_pre, |d, &pre| {
            if pre <= 0.0 {
                *d = 0.0;
            }
        });

        let dh_col = dh.view().insert_axis(Axis(1));
        let input_row = pass.input.view().insert_axis(Axis(0));
        self.hidden_weight += &dh_col.dot(&input_row);
        self.hidden_bias += &dh;

        // Input gradient; only the embedding slices feed updates, the
        // encoded feature slices are constants.
        let dx = net.hidden_weight.t().dot(&dh);
        self.user += &dx.slice(s![..USER_EMBED_DIM]);
        let movie_grad = dx
            .slice(s![USER_EMBED_DIM..USER_EMBED_DIM + MOVIE_EMBED_DIM])
            .to_owned();
        let row = self
            .movie_rows
            .entry(example.movie_index)
            .or_insert_with(|| Array1::zeros(MOVIE_EMBED_DIM));
        *row += &movie_grad;

        Ok(loss)
    }

    /// Apply the averaged gradient step.
    fn apply(self, net: &mut SuggestionNet, step: f32) {
        net.hidden_weight.scaled_add(-step, &self.hidden_weight);
        net.hidden_bias.scaled_add(-step, &self.hidden_bias);
        net.output_weight.scaled_add(-step, &self.output_weight);
        net.output_bias -= step * self.output_bias;
        net.user_embedding.row_mut(0).scaled_add(-step, &self.user);
        for (index, grad) in self.movie_rows {
            net.movie_embedding.row_mut(index).scaled_add(-step, &grad);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ModelDims;

    fn tiny_dims() -> ModelDims {
        ModelDims {
            num_movies: 2,
            num_genres: 2,
            num_actors: 0,
            num_directors: 0,
        }
    }

    fn record(genres: [f32; 2]) -> FeatureRecord {
        FeatureRecord {
            genre_vector: genres.to_vec(),
            actor_vector: vec![],
            director_vector: vec![],
            release_year: 0.0,
            duration: 0.0,
            popularity: 0.0,
            average_rating: 0.0,
        }
    }

    fn tiny_examples() -> Vec<TrainingExample> {
        vec![
            TrainingExample {
                user_id: 0,
                movie_index: 0,
                target: 0.9,
                features: record([1.0, 0.0]),
            },
            TrainingExample {
                user_id: 0,
                movie_index: 1,
                target: 0.2,
                features: record([0.0, 1.0]),
            },
        ]
    }

    fn seeded_config() -> TrainerConfig {
        TrainerConfig {
            epochs: 200,
            batch_size: 2,
            learning_rate: 0.3,
            impute_missing_ratings: true,
            seed: Some(42),
        }
    }

    #[test]
    fn test_training_reduces_loss() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = SuggestionNet::new(tiny_dims(), &mut rng);

        let report = train(&mut net, &tiny_examples(), &seeded_config()).unwrap();

        assert_eq!(report.examples, 2);
        assert!(
            report.final_loss < report.initial_loss,
            "loss did not trend down: {} -> {}",
            report.initial_loss,
            report.final_loss
        );
        assert!(report.final_loss < 0.05);
    }

    #[test]
    fn test_fitted_model_separates_targets() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = SuggestionNet::new(tiny_dims(), &mut rng);
        train(&mut net, &tiny_examples(), &seeded_config()).unwrap();

        let liked = net.predict(0, 0, &record([1.0, 0.0])).unwrap();
        let disliked = net.predict(0, 1, &record([0.0, 1.0])).unwrap();
        assert!(
            liked > disliked,
            "expected liked ({}) > disliked ({})",
            liked,
            disliked
        );
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let mut rng = StdRng::seed_from_u64(1);
        let net = SuggestionNet::new(tiny_dims(), &mut rng);
        let config = seeded_config();

        let mut a = net.clone();
        let mut b = net;
        let report_a = train(&mut a, &tiny_examples(), &config).unwrap();
        let report_b = train(&mut b, &tiny_examples(), &config).unwrap();

        assert_eq!(report_a.final_loss, report_b.final_loss);
    }

    #[test]
    fn test_zero_examples_is_a_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = SuggestionNet::new(tiny_dims(), &mut rng);
        let before = net.predict(0, 0, &record([1.0, 0.0])).unwrap();

        let report = train(&mut net, &[], &TrainerConfig::default()).unwrap();

        assert_eq!(report.examples, 0);
        assert_eq!(report.epochs, 0);
        let after = net.predict(0, 0, &record([1.0, 0.0])).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_foreign_cycle_example_aborts_before_mutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = SuggestionNet::new(tiny_dims(), &mut rng);
        let pristine = net.clone();

        let bad = vec![TrainingExample {
            user_id: 0,
            movie_index: 0,
            target: 0.5,
            features: FeatureRecord {
                genre_vector: vec![1.0, 0.0, 0.0],
                actor_vector: vec![],
                director_vector: vec![],
                release_year: 0.0,
                duration: 0.0,
                popularity: 0.0,
                average_rating: 0.0,
            },
        }];

        let err = train(&mut net, &bad, &seeded_config()).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));

        let probe = record([1.0, 0.0]);
        assert_eq!(
            pristine.predict(0, 0, &probe).unwrap(),
            net.predict(0, 0, &probe).unwrap()
        );
    }
}
