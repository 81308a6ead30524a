//! Prediction pipeline
//!
//! One submission flows form state -> feature vector -> scaler transform
//! -> model predict -> bucket classification. The pipeline is triggered
//! per explicit request, never reactively, and holds no mutable state.

use crate::bucket::{AqiBucket, ADVISORY};
use crate::error::Result;
use crate::forest::{ForestRegressor, TreeNode};
use crate::form::{FormState, FIELDS, NUM_FEATURES};
use crate::scaler::StandardScaler;
use crate::traits::{AqiRegressor, FeatureTransform};

/// Outcome of one prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted AQI scalar
    pub aqi: f32,
    /// Health category for the scalar
    pub bucket: AqiBucket,
}

impl Prediction {
    /// AQI formatted to two decimal places, as shown to users.
    #[must_use]
    pub fn formatted_aqi(&self) -> String {
        format!("{:.2}", self.aqi)
    }

    /// Advisory text, present only for hazardous categories.
    #[must_use]
    pub fn advisory(&self) -> Option<&'static str> {
        self.bucket.is_hazardous().then_some(ADVISORY)
    }
}

/// Scaler and model pair wired into one prediction path.
///
/// Generic over the two pipeline seams; the defaults are the artifact
/// types the service actually loads.
#[derive(Debug, Clone)]
pub struct Predictor<S = StandardScaler, M = ForestRegressor> {
    scaler: S,
    model: M,
}

impl<S: FeatureTransform, M: AqiRegressor> Predictor<S, M> {
    /// Pair a scaler with a model.
    pub fn new(scaler: S, model: M) -> Self {
        Self { scaler, model }
    }

    /// Run one submission through the full pipeline.
    ///
    /// # Errors
    ///
    /// Propagates shape errors from the scaler or model.
    pub fn handle(&self, form: &FormState) -> Result<Prediction> {
        self.predict(&form.feature_vector())
    }

    /// Predict from an already-assembled feature vector.
    ///
    /// # Errors
    ///
    /// Propagates shape errors from the scaler or model.
    pub fn predict(&self, features: &[f32]) -> Result<Prediction> {
        let scaled = self.scaler.transform(features)?;
        let aqi = self.model.predict(&scaled)?;
        Ok(Prediction {
            aqi,
            bucket: AqiBucket::classify(aqi),
        })
    }

    /// The scaler half of the pair.
    pub fn scaler(&self) -> &S {
        &self.scaler
    }

    /// The model half of the pair.
    pub fn model(&self) -> &M {
        &self.model
    }
}

impl Predictor {
    /// Deterministic demo predictor requiring no artifact files.
    ///
    /// An identity scaler feeds three hand-built trees splitting on the
    /// particulate features. With the default form values it predicts
    /// in the Moderate range.
    #[must_use]
    pub fn demo() -> Self {
        let names: Vec<&str> = FIELDS.iter().map(|f| f.name).collect();
        let scaler = StandardScaler::identity(&names);

        let pm25_tree = TreeNode::Split {
            feature: 0,
            threshold: 30.0,
            left: Box::new(TreeNode::Leaf { value: 40.0 }),
            right: Box::new(TreeNode::Split {
                feature: 0,
                threshold: 90.0,
                left: Box::new(TreeNode::Leaf { value: 110.0 }),
                right: Box::new(TreeNode::Split {
                    feature: 0,
                    threshold: 150.0,
                    left: Box::new(TreeNode::Leaf { value: 210.0 }),
                    right: Box::new(TreeNode::Leaf { value: 330.0 }),
                }),
            }),
        };
        let pm10_tree = TreeNode::Split {
            feature: 1,
            threshold: 50.0,
            left: Box::new(TreeNode::Leaf { value: 50.0 }),
            right: Box::new(TreeNode::Split {
                feature: 1,
                threshold: 150.0,
                left: Box::new(TreeNode::Leaf { value: 130.0 }),
                right: Box::new(TreeNode::Leaf { value: 260.0 }),
            }),
        };
        let blend_tree = TreeNode::Split {
            feature: 0,
            threshold: 60.0,
            left: Box::new(TreeNode::Leaf { value: 80.0 }),
            right: Box::new(TreeNode::Leaf { value: 190.0 }),
        };

        let model = ForestRegressor::new(NUM_FEATURES, vec![pm25_tree, pm10_tree, blend_tree])
            .unwrap_or_else(|_| unreachable!("demo forest is statically valid"));
        Self::new(scaler, model)
    }
}
