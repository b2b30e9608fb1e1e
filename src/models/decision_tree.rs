//! Decision Tree regressor
//!
//! CART-style regression tree: each split minimises the weighted mean squared
//! error of the two children. Nodes are stored in a flat arena with the root
//! at index 0.

use super::{check_fit_input, check_predict_input, Regressor};
use crate::error::Result;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 0,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean target of its samples
    Leaf { value: f64, n_samples: usize },
    /// Internal node: rows with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity: f64,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf { n_samples, .. } | TreeNode::Split { n_samples, .. } => *n_samples,
        }
    }
}

/// Best split found for a node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Node waiting to be grown
struct PendingNode {
    id: usize,
    samples: Vec<usize>,
    depth: usize,
}

/// Decision Tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    nodes: Vec<TreeNode>,
    n_features: Option<usize>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: None,
            feature_importances: Vec::new(),
        }
    }

    /// Grow the tree on the given rows of `x`/`y`.
    ///
    /// Rows may repeat, which is how bootstrap samples are passed in.
    pub(crate) fn fit_samples(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        samples: Vec<usize>,
    ) {
        let n_features = x.ncols();
        self.n_features = Some(n_features);
        self.feature_importances = vec![0.0; n_features];
        self.nodes.clear();

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let min_split = self.config.min_samples_split.max(2);
        let min_leaf = self.config.min_samples_leaf.max(1);

        self.nodes.push(TreeNode::Leaf {
            value: 0.0,
            n_samples: 0,
        });
        let mut stack = vec![PendingNode {
            id: 0,
            samples,
            depth: 0,
        }];

        while let Some(PendingNode { id, samples, depth }) = stack.pop() {
            let n = samples.len();
            let (mean, impurity) = mean_and_mse(&y, &samples);

            let depth_left = self.config.max_depth.map_or(true, |d| depth < d);
            let pure = samples.iter().all(|&i| y[i] == y[samples[0]]);

            let best = if depth_left && !pure && n >= min_split && n >= 2 * min_leaf {
                self.find_best_split(&x, &y, &samples, mean, impurity, min_leaf, &mut rng)
            } else {
                None
            };

            let Some(best) = best else {
                self.nodes[id] = TreeNode::Leaf {
                    value: mean,
                    n_samples: n,
                };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .iter()
                .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

            // A split must shrink both sides or growth never terminates
            if left_samples.is_empty() || right_samples.is_empty() {
                self.nodes[id] = TreeNode::Leaf {
                    value: mean,
                    n_samples: n,
                };
                continue;
            }

            self.feature_importances[best.feature_idx] += best.gain * n as f64;

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(TreeNode::Leaf {
                value: 0.0,
                n_samples: 0,
            });
            self.nodes.push(TreeNode::Leaf {
                value: 0.0,
                n_samples: 0,
            });
            self.nodes[id] = TreeNode::Split {
                feature_idx: best.feature_idx,
                threshold: best.threshold,
                left,
                right,
                n_samples: n,
                impurity,
            };

            stack.push(PendingNode {
                id: right,
                samples: right_samples,
                depth: depth + 1,
            });
            stack.push(PendingNode {
                id: left,
                samples: left_samples,
                depth: depth + 1,
            });
        }

        // Normalize feature importances
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    /// Find the split with the largest impurity decrease.
    ///
    /// For each candidate feature the samples are sorted once and swept left
    /// to right with running sums of the centered targets.
    #[allow(clippy::too_many_arguments)]
    fn find_best_split(
        &self,
        x: &ArrayView2<'_, f64>,
        y: &ArrayView1<'_, f64>,
        samples: &[usize],
        mean: f64,
        impurity: f64,
        min_leaf: usize,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n = samples.len();
        let n_features = x.ncols();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features);

        // Select features to consider
        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let total_sum: f64 = samples.iter().map(|&i| y[i] - mean).sum();
        let total_sq: f64 = samples.iter().map(|&i| (y[i] - mean).powi(2)).sum();

        let mut best_gain = 0.0;
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = samples.to_vec();

        for &feature_idx in &feature_indices {
            sorted.sort_by(|&a, &b| x[[a, feature_idx]].total_cmp(&x[[b, feature_idx]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 0..n - 1 {
                let centered = y[sorted[k]] - mean;
                left_sum += centered;
                left_sq += centered * centered;

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let current = x[[sorted[k], feature_idx]];
                let next = x[[sorted[k + 1], feature_idx]];
                if next.partial_cmp(&current) != Some(Ordering::Greater) {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = (left_sq - left_sum * left_sum / n_left as f64).max(0.0);
                let right_sse = (right_sq - right_sum * right_sum / n_right as f64).max(0.0);

                let gain = impurity - (left_sse + right_sse) / n as f64;
                if gain > best_gain {
                    let mut threshold = (current + next) / 2.0;
                    if threshold >= next {
                        threshold = current;
                    }
                    if !threshold.is_finite() {
                        continue;
                    }
                    best_gain = gain;
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Predict for a single sample; the caller checks the row width
    pub(crate) fn predict_one(&self, features: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                }) => {
                    id = if features[*feature_idx] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(TreeNode::Leaf { value, .. }) => return *value,
                None => return 0.0,
            }
        }
    }

    /// Get feature importances (normalized to sum to 1)
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Tree nodes, root first
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the tree (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match self.nodes.get(id) {
                Some(TreeNode::Split { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(TreeNode::Leaf { .. }) => max_depth = max_depth.max(depth),
                None => {}
            }
        }
        max_depth
    }
}

impl Regressor for DecisionTree {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        check_fit_input(&x, &y)?;
        let samples: Vec<usize> = (0..x.nrows()).collect();
        self.fit_samples(x, y, samples);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        check_predict_input(&x, self.n_features)?;
        Ok(x.rows().into_iter().map(|row| self.predict_one(row)).collect())
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

fn mean_and_mse(y: &ArrayView1<'_, f64>, samples: &[usize]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&i| y[i]).sum::<f64>() / n;
    let mse = samples.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / n;
    (mean, mse)
}
