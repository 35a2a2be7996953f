//! Random-forest classifier over sparse feature vectors.
//!
//! An ensemble of Gini-split decision trees, each trained on a bootstrap
//! sample of the rows with a random subset of candidate features per split.
//! Prediction is the majority vote of the trees. Per-tree seeds are derived
//! from the forest seed, so training is deterministic for a given seed.

use std::collections::BTreeSet;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::ml::vectorizer::SparseVector;

/// Hyperparameters for a random forest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
        }
    }
}

/// A single decision tree with Gini-impurity splits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<Box<TreeNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeNode {
    /// Feature index for split (-1 for leaf).
    feature_idx: i64,
    /// Threshold value for split.
    threshold: f64,
    /// Positive-class fraction (for leaf nodes).
    value: f64,
    /// Left child (feature value <= threshold).
    left: Option<Box<TreeNode>>,
    /// Right child.
    right: Option<Box<TreeNode>>,
}

/// Look up a feature value in a sparse row; absent features are zero.
fn feature_value(row: &SparseVector, feature: u32) -> f64 {
    match row.binary_search_by_key(&feature, |&(idx, _)| idx) {
        Ok(pos) => row[pos].1,
        Err(_) => 0.0,
    }
}

/// Gini impurity of a binary label set.
fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

impl DecisionTree {
    /// Fit a tree on the given row indices.
    fn fit(
        rows: &[SparseVector],
        labels: &[u8],
        indices: &[usize],
        n_features: usize,
        config: &ForestConfig,
        rng: &mut StdRng,
    ) -> Self {
        let root = Self::build_tree(rows, labels, indices, 0, n_features, config, rng);
        DecisionTree { root }
    }

    /// Predict the positive-class probability for one row.
    pub fn predict_proba(&self, row: &SparseVector) -> f64 {
        match &self.root {
            Some(root) => Self::predict_node(root, row),
            None => 0.0,
        }
    }

    fn leaf(positives: usize, total: usize) -> Option<Box<TreeNode>> {
        let value = if total == 0 {
            0.0
        } else {
            positives as f64 / total as f64
        };
        Some(Box::new(TreeNode {
            feature_idx: -1,
            threshold: 0.0,
            value,
            left: None,
            right: None,
        }))
    }

    /// Recursively build the tree.
    ///
    /// Splitting stops at maximum depth, when too few samples remain, when
    /// the node is pure, or when no candidate split reduces impurity.
    fn build_tree(
        rows: &[SparseVector],
        labels: &[u8],
        indices: &[usize],
        depth: usize,
        n_features: usize,
        config: &ForestConfig,
        rng: &mut StdRng,
    ) -> Option<Box<TreeNode>> {
        let total = indices.len();
        let positives = indices.iter().filter(|&&i| labels[i] == 1).count();

        if total < config.min_samples_split
            || depth >= config.max_depth
            || positives == 0
            || positives == total
        {
            return Self::leaf(positives, total);
        }

        match Self::find_best_split(rows, labels, indices, n_features, rng) {
            Some((feature_idx, threshold)) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| feature_value(&rows[i], feature_idx) <= threshold);

                let left = Self::build_tree(
                    rows,
                    labels,
                    &left_indices,
                    depth + 1,
                    n_features,
                    config,
                    rng,
                );
                let right = Self::build_tree(
                    rows,
                    labels,
                    &right_indices,
                    depth + 1,
                    n_features,
                    config,
                    rng,
                );

                Some(Box::new(TreeNode {
                    feature_idx: feature_idx as i64,
                    threshold,
                    value: 0.0,
                    left,
                    right,
                }))
            }
            None => Self::leaf(positives, total),
        }
    }

    /// Find the impurity-minimizing split among a random feature subset.
    ///
    /// Candidates are drawn from the features actually present in the node's
    /// rows (an all-zero feature cannot split), sampling sqrt of the total
    /// feature count. Thresholds are scanned between consecutive distinct
    /// values, as in a sorted exhaustive search.
    fn find_best_split(
        rows: &[SparseVector],
        labels: &[u8],
        indices: &[usize],
        n_features: usize,
        rng: &mut StdRng,
    ) -> Option<(u32, f64)> {
        // BTreeSet keeps candidate order stable so seeded runs reproduce.
        let present: BTreeSet<u32> = indices
            .iter()
            .flat_map(|&i| rows[i].iter().map(|&(idx, _)| idx))
            .collect();
        if present.is_empty() {
            return None;
        }
        let present: Vec<u32> = present.into_iter().collect();

        let n_candidates = ((n_features as f64).sqrt().ceil() as usize)
            .clamp(1, present.len());
        let candidates = sample(rng, present.len(), n_candidates);

        let total = indices.len();
        let total_pos = indices.iter().filter(|&&i| labels[i] == 1).count();
        let parent_impurity = gini(total_pos, total);

        let mut best_gain = 1e-12;
        let mut best_split = None;

        for candidate in candidates.iter() {
            let feature = present[candidate];

            let mut values: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (feature_value(&rows[i], feature), labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

            let mut left_pos = 0;
            for i in 1..values.len() {
                if values[i - 1].1 == 1 {
                    left_pos += 1;
                }
                if values[i].0 <= values[i - 1].0 {
                    continue;
                }

                let left_n = i;
                let right_n = total - i;
                let right_pos = total_pos - left_pos;
                let weighted = (left_n as f64 * gini(left_pos, left_n)
                    + right_n as f64 * gini(right_pos, right_n))
                    / total as f64;
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    let threshold = (values[i - 1].0 + values[i].0) / 2.0;
                    best_split = Some((feature, threshold));
                }
            }
        }

        best_split
    }

    /// Predict using a tree node.
    fn predict_node(node: &TreeNode, row: &SparseVector) -> f64 {
        if node.feature_idx < 0 {
            return node.value;
        }

        let value = feature_value(row, node.feature_idx as u32);
        if value <= node.threshold {
            match &node.left {
                Some(left) => Self::predict_node(left, row),
                None => node.value,
            }
        } else {
            match &node.right {
                Some(right) => Self::predict_node(right, row),
                None => node.value,
            }
        }
    }
}

/// Random forest for one binary category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    config: ForestConfig,
}

impl RandomForest {
    /// Train a forest on sparse rows and binary labels.
    ///
    /// Each tree sees a bootstrap sample of the rows; tree seeds are derived
    /// from `seed` so the fit is reproducible.
    pub fn fit(
        rows: &[SparseVector],
        labels: &[u8],
        n_features: usize,
        config: &ForestConfig,
        seed: u64,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(TriageError::model("Cannot fit forest on an empty corpus"));
        }
        if rows.len() != labels.len() {
            return Err(TriageError::model(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if config.n_trees == 0 {
            return Err(TriageError::model("Forest needs at least one tree"));
        }

        let n = rows.len();
        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|t| {
                let tree_seed = seed.wrapping_add((t as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                DecisionTree::fit(rows, labels, &bootstrap, n_features, config, &mut rng)
            })
            .collect();

        Ok(RandomForest {
            trees,
            config: *config,
        })
    }

    /// Predict the positive-class probability for one row.
    pub fn predict_proba(&self, row: &SparseVector) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict_proba(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict the binary label for one row by majority vote.
    pub fn predict(&self, row: &SparseVector) -> u8 {
        u8::from(self.predict_proba(row) >= 0.5)
    }

    /// Number of trees in the ensemble.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// The hyperparameters this forest was trained with.
    pub fn config(&self) -> ForestConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 15,
            max_depth: 4,
            min_samples_split: 2,
        }
    }

    /// Rows where feature 0 marks the positive class.
    fn separable_data() -> (Vec<SparseVector>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            if i % 2 == 0 {
                rows.push(vec![(0, 1.0), (2, 0.3)]);
                labels.push(1);
            } else {
                rows.push(vec![(1, 1.0), (3, 0.3)]);
                labels.push(0);
            }
        }
        (rows, labels)
    }

    #[test]
    fn test_forest_learns_separable_data() {
        let (rows, labels) = separable_data();
        let forest = RandomForest::fit(&rows, &labels, 4, &small_config(), 7).unwrap();

        assert_eq!(forest.predict(&vec![(0, 1.0)]), 1);
        assert_eq!(forest.predict(&vec![(1, 1.0)]), 0);
    }

    #[test]
    fn test_forest_is_deterministic_per_seed() {
        let (rows, labels) = separable_data();
        let forest_a = RandomForest::fit(&rows, &labels, 4, &small_config(), 42).unwrap();
        let forest_b = RandomForest::fit(&rows, &labels, 4, &small_config(), 42).unwrap();

        for row in &rows {
            assert_eq!(forest_a.predict_proba(row), forest_b.predict_proba(row));
        }
    }

    #[test]
    fn test_single_class_training() {
        let rows: Vec<SparseVector> = (0..10).map(|i| vec![(i as u32 % 3, 1.0)]).collect();
        let labels = vec![1; 10];

        let forest = RandomForest::fit(&rows, &labels, 3, &small_config(), 1).unwrap();
        assert_eq!(forest.predict(&vec![(0, 1.0)]), 1);
        assert_eq!(forest.predict(&vec![]), 1);
    }

    #[test]
    fn test_empty_training_set_rejected() {
        let result = RandomForest::fit(&[], &[], 4, &small_config(), 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let rows: Vec<SparseVector> = vec![vec![(0, 1.0)]];
        let result = RandomForest::fit(&rows, &[1, 0], 4, &small_config(), 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_tree_count_and_config() {
        let (rows, labels) = separable_data();
        let forest = RandomForest::fit(&rows, &labels, 4, &small_config(), 7).unwrap();
        assert_eq!(forest.tree_count(), 15);
        assert_eq!(forest.config().max_depth, 4);
    }
}
