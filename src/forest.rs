//! Random forest regressor (inference only)
//!
//! Trees are trained elsewhere and exported as nested split/leaf nodes. A
//! sample goes left when `x[feature] <= threshold`; the forest prediction is
//! the mean of the leaf values reached in each tree.

use serde::{Deserialize, Serialize};

use crate::predictor::{CostModel, InferenceError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: f64,
    },
}

impl TreeNode {
    pub fn leaf(value: f64) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn split(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Largest feature index referenced by any split, if there is a split
    pub fn max_feature(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => [Some(*feature), left.max_feature(), right.max_feature()]
                .into_iter()
                .flatten()
                .max(),
        }
    }

    /// True when every threshold and leaf value is finite
    pub fn is_finite(&self) -> bool {
        match self {
            TreeNode::Leaf { value } => value.is_finite(),
            TreeNode::Split {
                threshold,
                left,
                right,
                ..
            } => threshold.is_finite() && left.is_finite() && right.is_finite(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub root: TreeNode,
}

impl RegressionTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    /// Walk the tree for one sample. Callers guarantee `x` is long enough.
    fn predict_one(&self, x: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForestRegressor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub kind: ModelKind,
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(n_features: usize, trees: Vec<RegressionTree>) -> Self {
        Self {
            kind: ModelKind::RandomForestRegressor,
            n_features,
            trees,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(|t| t.root.depth()).max().unwrap_or(0)
    }
}

impl CostModel for RandomForestRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
        if x.len() != self.n_features {
            return Err(InferenceError::DimensionMismatch {
                stage: "model",
                expected: self.n_features,
                actual: x.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(InferenceError::EmptyModel);
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict_one(x)).sum();
        let prediction = total / self.trees.len() as f64;

        if !prediction.is_finite() {
            return Err(InferenceError::NonFinite(prediction));
        }
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> RegressionTree {
        RegressionTree::new(TreeNode::split(
            feature,
            threshold,
            TreeNode::leaf(left),
            TreeNode::leaf(right),
        ))
    }

    #[test]
    fn test_threshold_is_inclusive_on_the_left() {
        let forest = RandomForestRegressor::new(1, vec![stump(0, 0.5, 1.0, 2.0)]);
        assert_eq!(forest.predict(&[0.5]).unwrap(), 1.0);
        assert_eq!(forest.predict(&[0.51]).unwrap(), 2.0);
    }

    #[test]
    fn test_prediction_is_mean_of_trees() {
        let forest = RandomForestRegressor::new(
            2,
            vec![stump(0, 0.0, 100.0, 200.0), stump(1, 0.0, 10.0, 40.0)],
        );
        // tree 1 -> 200, tree 2 -> 10
        assert_eq!(forest.predict(&[1.0, -1.0]).unwrap(), 105.0);
    }

    #[test]
    fn test_nested_tree_walk() {
        let tree = RegressionTree::new(TreeNode::split(
            0,
            0.0,
            TreeNode::split(1, 5.0, TreeNode::leaf(1.0), TreeNode::leaf(2.0)),
            TreeNode::leaf(3.0),
        ));
        assert_eq!(tree.predict_one(&[-1.0, 6.0]), 2.0);
        assert_eq!(tree.root.depth(), 2);
        assert_eq!(tree.root.max_feature(), Some(1));
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let forest = RandomForestRegressor::new(2, vec![stump(0, 0.0, 1.0, 2.0)]);
        assert!(matches!(
            forest.predict(&[1.0]),
            Err(InferenceError::DimensionMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_empty_forest_is_rejected() {
        let forest = RandomForestRegressor::new(1, vec![]);
        assert!(matches!(forest.predict(&[1.0]), Err(InferenceError::EmptyModel)));
    }

    #[test]
    fn test_deserialize_nested_nodes() {
        let json = r#"{
            "kind": "random_forest_regressor",
            "n_features": 1,
            "trees": [{"root": {"split": {
                "feature": 0, "threshold": 1.5,
                "left": {"leaf": {"value": 7.0}},
                "right": {"leaf": {"value": 9.0}}
            }}}]
        }"#;
        let forest: RandomForestRegressor = serde_json::from_str(json).unwrap();
        assert_eq!(forest.n_trees(), 1);
        assert_eq!(forest.max_depth(), 1);
        assert_eq!(forest.predict(&[2.0]).unwrap(), 9.0);
    }
}
