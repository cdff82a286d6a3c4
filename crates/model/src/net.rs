//! The hybrid rating-prediction network.
//!
//! Two embedding lookup tables, one over the movie-id index space and one
//! over the single-user id space (effectively a learned global bias), are
//! concatenated with the dense features (multi-hot genre/actor/director
//! vectors and four numeric scalars), pushed through one ReLU hidden layer,
//! and collapsed to a single sigmoid output matching the normalized-rating
//! target domain [0, 1].
//!
//! The movie table carries `num_movies + 1` rows; the extra row is the
//! reserved "unseen movie" slot, so a candidate absent from training can be
//! scored without reshaping the table. Inference is read-only over the
//! parameters and therefore safe to run concurrently.

use ndarray::{Array1, Array2, Axis};
use pipeline::FeatureRecord;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Width of the user embedding
pub const USER_EMBED_DIM: usize = 4;

/// Width of the movie embedding
pub const MOVIE_EMBED_DIM: usize = 8;

/// Hidden layer width
pub const HIDDEN_DIM: usize = 32;

/// Number of numeric scalar features (year, duration, popularity, avg rating)
pub const NUM_SCALARS: usize = 4;

/// Shape parameters fixed at cycle start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDims {
    /// Movies in the training enumeration (the embedding table holds one
    /// extra row for unseen movies)
    pub num_movies: usize,
    pub num_genres: usize,
    pub num_actors: usize,
    pub num_directors: usize,
}

impl ModelDims {
    /// Width of the concatenated input vector fed to the hidden layer.
    pub fn input_width(&self) -> usize {
        USER_EMBED_DIM
            + MOVIE_EMBED_DIM
            + self.num_genres
            + self.num_actors
            + self.num_directors
            + NUM_SCALARS
    }
}

/// Intermediate activations kept for backpropagation.
pub(crate) struct ForwardPass {
    pub input: Array1<f32>,
    pub hidden_pre: Array1<f32>,
    pub hidden: Array1<f32>,
    pub output: f32,
}

/// The rating-prediction model for one training cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionNet {
    dims: ModelDims,
    /// [1, USER_EMBED_DIM]: single implicit user
    pub(crate) user_embedding: Array2<f32>,
    /// [num_movies + 1, MOVIE_EMBED_DIM]: last row reserved for unseen movies
    pub(crate) movie_embedding: Array2<f32>,
    /// [HIDDEN_DIM, input_width]
    pub(crate) hidden_weight: Array2<f32>,
    pub(crate) hidden_bias: Array1<f32>,
    /// [HIDDEN_DIM]
    pub(crate) output_weight: Array1<f32>,
    pub(crate) output_bias: f32,
}

impl SuggestionNet {
    /// Create a freshly initialized network for the given shapes.
    ///
    /// Dense weights use Xavier-style uniform init; embeddings start as
    /// small uniform noise.
    pub fn new(dims: ModelDims, rng: &mut impl Rng) -> Self {
        let input_width = dims.input_width();

        let hidden_bound = (6.0 / (input_width + HIDDEN_DIM) as f32).sqrt();
        let hidden_weight = Array2::from_shape_fn((HIDDEN_DIM, input_width), |_| {
            rng.random_range(-hidden_bound..hidden_bound)
        });

        let output_bound = (6.0 / (HIDDEN_DIM + 1) as f32).sqrt();
        let output_weight =
            Array1::from_shape_fn(HIDDEN_DIM, |_| rng.random_range(-output_bound..output_bound));

        let user_embedding =
            Array2::from_shape_fn((1, USER_EMBED_DIM), |_| rng.random_range(-0.05..0.05));
        let movie_embedding = Array2::from_shape_fn((dims.num_movies + 1, MOVIE_EMBED_DIM), |_| {
            rng.random_range(-0.05..0.05)
        });

        Self {
            dims,
            user_embedding,
            movie_embedding,
            hidden_weight,
            hidden_bias: Array1::zeros(HIDDEN_DIM),
            output_weight,
            output_bias: 0.0,
        }
    }

    pub fn dims(&self) -> &ModelDims {
        &self.dims
    }

    /// The reserved embedding row used to score movies absent from training.
    pub fn unseen_movie_index(&self) -> usize {
        self.dims.num_movies
    }

    /// Predict the normalized rating in [0, 1] for (user, movie, features).
    ///
    /// Callers rescale to the raw [0, 5] scale by multiplying by 5.
    pub fn predict(
        &self,
        user_id: u32,
        movie_index: usize,
        features: &FeatureRecord,
    ) -> Result<f32, ModelError> {
        Ok(self.forward(user_id, movie_index, features)?.output)
    }

    /// Precondition checks shared by inference and training.
    ///
    /// Vector-length mismatches mean the record was encoded against a
    /// different cycle's vocabulary than this model was trained with.
    pub fn check(
        &self,
        user_id: u32,
        movie_index: usize,
        features: &FeatureRecord,
    ) -> Result<(), ModelError> {
        if user_id as usize >= self.user_embedding.nrows() {
            return Err(ModelError::UnknownUser(user_id));
        }
        if movie_index >= self.movie_embedding.nrows() {
            return Err(ModelError::MovieIndexOutOfRange {
                index: movie_index,
                rows: self.movie_embedding.nrows(),
            });
        }

        let checks = [
            ("genre_vector", self.dims.num_genres, features.genre_vector.len()),
            ("actor_vector", self.dims.num_actors, features.actor_vector.len()),
            (
                "director_vector",
                self.dims.num_directors,
                features.director_vector.len(),
            ),
        ];
        for (field, expected, found) in checks {
            if expected != found {
                return Err(ModelError::ShapeMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn forward(
        &self,
        user_id: u32,
        movie_index: usize,
        features: &FeatureRecord,
    ) -> Result<ForwardPass, ModelError> {
        self.check(user_id, movie_index, features)?;

        let input = self.input_vector(user_id, movie_index, features);
        let hidden_pre = self.hidden_weight.dot(&input) + &self.hidden_bias;
        let hidden = hidden_pre.mapv(relu);
        let output = sigmoid(self.output_weight.dot(&hidden) + self.output_bias);

        Ok(ForwardPass {
            input,
            hidden_pre,
            hidden,
            output,
        })
    }

    /// Concatenate embeddings, multi-hot vectors and scalars into one input.
    fn input_vector(&self, user_id: u32, movie_index: usize, features: &FeatureRecord) -> Array1<f32> {
        let mut input = Vec::with_capacity(self.dims.input_width());
        input.extend(self.user_embedding.index_axis(Axis(0), user_id as usize).iter());
        input.extend(self.movie_embedding.index_axis(Axis(0), movie_index).iter());
        input.extend(features.genre_vector.iter());
        input.extend(features.actor_vector.iter());
        input.extend(features.director_vector.iter());
        input.push(features.release_year);
        input.push(features.duration);
        input.push(features.popularity);
        input.push(features.average_rating);
        Array1::from(input)
    }
}

fn relu(v: f32) -> f32 {
    v.max(0.0)
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}
