//! Core traits for the prediction pipeline
//!
//! The pipeline is generic over these two seams so that scaler and model
//! implementations can be swapped (including test stand-ins) without
//! touching the orchestration code.

use crate::error::Result;

/// Feature preprocessing step applied before the model sees the vector.
///
/// Implementations must preserve element order: output position `i`
/// corresponds to input position `i`.
pub trait FeatureTransform {
    /// Transform a raw feature vector into model space.
    ///
    /// # Errors
    ///
    /// Returns an error if `features.len()` does not match [`Self::n_features`].
    fn transform(&self, features: &[f32]) -> Result<Vec<f32>>;

    /// Number of features this transform expects.
    fn n_features(&self) -> usize;
}

/// Regression model producing a scalar AQI from a transformed vector.
pub trait AqiRegressor {
    /// Predict the AQI for one feature vector.
    ///
    /// # Errors
    ///
    /// Returns an error if `features.len()` does not match [`Self::n_features`].
    fn predict(&self, features: &[f32]) -> Result<f32>;

    /// Number of features this model expects.
    fn n_features(&self) -> usize;
}
