//! Rating normalization for training targets.
//!
//! Raw watchlist ratings live in [0, 5]; the model regresses against [0, 1].
//! Missing or non-positive ratings are imputed with the midpoint 0.5; the
//! placeholder means "no signal", not "mediocre". Imputing (rather than
//! dropping the row) keeps unrated watchlist movies contributing their
//! feature side to training at the cost of pulling their targets toward the
//! middle. The drop variant still exists behind
//! `TrainerConfig::impute_missing_ratings = false`.

/// Upper bound of the raw rating scale.
pub const MAX_RATING: f32 = 5.0;

/// Imputed target for movies with no usable rating.
pub const NEUTRAL_TARGET: f32 = 0.5;

/// Map a raw optional rating to a training target in [0, 1].
///
/// Present and positive ratings are scaled by 5; everything else (absent,
/// zero, negative) becomes [`NEUTRAL_TARGET`].
pub fn normalize(raw: Option<f32>) -> f32 {
    match raw {
        Some(r) if r > 0.0 => (r / MAX_RATING).clamp(0.0, 1.0),
        _ => NEUTRAL_TARGET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_marks_normalize_to_one() {
        assert_eq!(normalize(Some(5.0)), 1.0);
    }

    #[test]
    fn test_zero_and_missing_are_imputed() {
        assert_eq!(normalize(Some(0.0)), NEUTRAL_TARGET);
        assert_eq!(normalize(Some(-1.0)), NEUTRAL_TARGET);
        assert_eq!(normalize(None), NEUTRAL_TARGET);
    }

    #[test]
    fn test_midpoint_coincides_with_placeholder() {
        // 2.5 / 5.0 happens to equal the imputation placeholder
        assert_eq!(normalize(Some(2.5)), 0.5);
    }

    #[test]
    fn test_positive_ratings_scale_linearly() {
        for r in [0.5_f32, 1.0, 2.0, 3.3, 4.0, 5.0] {
            assert!((normalize(Some(r)) - r / 5.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_out_of_scale_ratings_are_clamped() {
        assert_eq!(normalize(Some(7.0)), 1.0);
    }
}
