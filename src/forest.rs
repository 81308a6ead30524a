//! Random-forest regression over serialized decision trees
//!
//! Trees arrive pre-fitted inside a model artifact; prediction walks
//! each tree to a leaf and averages the leaf values. No training code
//! lives in this crate.

use serde::{Deserialize, Serialize};

use crate::error::{RespirarError, Result};
use crate::traits::AqiRegressor;

/// One node of a fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node carrying the predicted value
    Leaf {
        /// Value produced when traversal ends here
        value: f32,
    },
    /// Internal split on one feature
    Split {
        /// Index into the feature vector
        feature: usize,
        /// Go left when `features[feature] <= threshold`
        threshold: f32,
        /// Subtree for values at or below the threshold
        left: Box<TreeNode>,
        /// Subtree for values above the threshold
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Walk the tree for one feature vector and return the leaf value.
    #[must_use]
    pub fn evaluate(&self, features: &[f32]) -> f32 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Largest feature index referenced anywhere in the tree.
    ///
    /// `None` for a bare leaf, which reads no features.
    #[must_use]
    pub fn max_feature_index(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => {
                let mut max = *feature;
                if let Some(l) = left.max_feature_index() {
                    max = max.max(l);
                }
                if let Some(r) = right.max_feature_index() {
                    max = max.max(r);
                }
                Some(max)
            }
        }
    }

    /// Depth of the tree (a bare leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Ensemble of fitted regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRegressor {
    /// Width of the feature vector the trees were fitted on
    n_features: usize,
    /// Fitted trees, averaged at prediction time
    trees: Vec<TreeNode>,
}

impl ForestRegressor {
    /// Build a forest from fitted trees.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the forest is empty or any tree
    /// references a feature index at or beyond `n_features`.
    pub fn new(n_features: usize, trees: Vec<TreeNode>) -> Result<Self> {
        if trees.is_empty() {
            return Err(RespirarError::InvalidConfiguration {
                reason: "forest has no trees".to_string(),
            });
        }
        for (i, tree) in trees.iter().enumerate() {
            if let Some(max) = tree.max_feature_index() {
                if max >= n_features {
                    return Err(RespirarError::InvalidConfiguration {
                        reason: format!(
                            "tree {i} splits on feature {max} but the forest is fitted on {n_features} features"
                        ),
                    });
                }
            }
        }
        Ok(Self { n_features, trees })
    }

    /// Number of trees in the ensemble
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Width of the feature vector this forest expects
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// The fitted trees
    #[must_use]
    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    /// Depth of the deepest tree
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

impl AqiRegressor for ForestRegressor {
    fn predict(&self, features: &[f32]) -> Result<f32> {
        if features.len() != self.n_features {
            return Err(RespirarError::InvalidShape {
                reason: format!(
                    "expected {} features, got {}",
                    self.n_features,
                    features.len()
                ),
            });
        }
        let sum: f32 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        #[allow(clippy::cast_precision_loss)]
        Ok(sum / self.trees.len() as f32)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
