//! Standard-score feature scaling
//!
//! Applies the `z = (x - mean) / std` transform with parameters fitted
//! offline and shipped inside a scaler artifact. There is no `fit` here;
//! training happens out of process.

use serde::{Deserialize, Serialize};

use crate::error::{RespirarError, Result};
use crate::traits::FeatureTransform;

/// Per-feature standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Feature names in the order the parameters apply
    feature_names: Vec<String>,
    /// Per-feature means subtracted before scaling
    mean: Vec<f32>,
    /// Per-feature standard deviations divided after centering
    std: Vec<f32>,
}

impl StandardScaler {
    /// Build a scaler from fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the three vectors differ in
    /// length, any parameter is non-finite, or any standard deviation
    /// is zero (the transform would divide by it).
    pub fn new(feature_names: Vec<String>, mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        if feature_names.len() != mean.len() || mean.len() != std.len() {
            return Err(RespirarError::InvalidConfiguration {
                reason: format!(
                    "parameter lengths differ: {} names, {} means, {} stds",
                    feature_names.len(),
                    mean.len(),
                    std.len()
                ),
            });
        }
        for (i, value) in mean.iter().enumerate() {
            if !value.is_finite() {
                return Err(RespirarError::InvalidConfiguration {
                    reason: format!("mean[{i}] is not finite"),
                });
            }
        }
        for (i, value) in std.iter().enumerate() {
            if !value.is_finite() || *value == 0.0 {
                return Err(RespirarError::InvalidConfiguration {
                    reason: format!("std[{i}] must be finite and nonzero, got {value}"),
                });
            }
        }
        Ok(Self {
            feature_names,
            mean,
            std,
        })
    }

    /// Identity scaler (mean 0, std 1) over the given feature names.
    ///
    /// Used by demo mode and tests where raw values should pass through
    /// unchanged.
    #[must_use]
    pub fn identity(feature_names: &[&str]) -> Self {
        Self {
            feature_names: feature_names.iter().map(ToString::to_string).collect(),
            mean: vec![0.0; feature_names.len()],
            std: vec![1.0; feature_names.len()],
        }
    }

    /// Feature names this scaler was fitted on, in order
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of features this scaler expects
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Fitted means
    #[must_use]
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Fitted standard deviations
    #[must_use]
    pub fn std(&self) -> &[f32] {
        &self.std
    }
}

impl FeatureTransform for StandardScaler {
    fn transform(&self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != self.mean.len() {
            return Err(RespirarError::InvalidShape {
                reason: format!(
                    "expected {} features, got {}",
                    self.mean.len(),
                    features.len()
                ),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.std.iter()))
            .map(|(x, (mean, std))| (x - mean) / std)
            .collect())
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    #[test]
    fn test_transform_standardizes() {
        let scaler = StandardScaler::new(names(3), vec![10.0, 0.0, -5.0], vec![2.0, 1.0, 0.5])
            .unwrap();
        let out = scaler.transform(&[14.0, 3.0, -5.0]).unwrap();
        assert_eq!(out, vec![2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_transform_preserves_order() {
        let scaler = StandardScaler::new(names(4), vec![0.0; 4], vec![1.0; 4]).unwrap();
        let out = scaler.transform(&[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(out, vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_identity_is_noop() {
        let scaler = StandardScaler::identity(&["a", "b"]);
        let out = scaler.transform(&[7.5, -2.0]).unwrap();
        assert_eq!(out, vec![7.5, -2.0]);
        assert_eq!(scaler.n_features(), 2);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let scaler = StandardScaler::identity(&["a", "b", "c"]);
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("expected 3 features, got 2"));
    }

    #[test]
    fn test_zero_std_rejected_at_construction() {
        let result = StandardScaler::new(names(2), vec![0.0, 0.0], vec![1.0, 0.0]);
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("std[1]"), "unexpected message: {msg}");
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = StandardScaler::new(names(3), vec![0.0; 2], vec![1.0; 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_finite_mean_rejected() {
        let result = StandardScaler::new(names(1), vec![f32::NAN], vec![1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let scaler =
            StandardScaler::new(names(2), vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let back: StandardScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scaler);
    }
}
