//! CART (Classification and Regression Tree) builder
//!
//! Grows one classification tree by exact-greedy Gini splits over a random
//! subset of features at each node. Values are compared in single
//! precision, as the ported code does, and thresholds sit halfway between
//! consecutive distinct `f32` values.

use rand::Rng;
use rfport_core::{goes_left, Node, Tree};

use crate::deterministic::{feature_order, MaxFeatures, SplitTieBreaker};
use crate::errors::{Result, TrainerError};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

/// Split candidate with weighted child impurity and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    impurity: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: f64, impurity: f64) -> Self {
        Self {
            feature_idx,
            threshold,
            impurity,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold),
        }
    }

    fn beats(&self, other: &SplitCandidate) -> bool {
        self.impurity < other.impurity
            || (self.impurity == other.impurity && self.tie_breaker < other.tie_breaker)
    }
}

/// Build a classification tree over a (possibly repeating) sample of rows
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    class_indices: &'a [usize],
    class_count: usize,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    /// `class_indices[i]` is the position of row `i`'s label in the sorted
    /// class list; `class_count` is that list's length.
    pub fn new(
        features: &'a [Vec<f64>],
        class_indices: &'a [usize],
        class_count: usize,
        config: TreeConfig,
    ) -> Result<Self> {
        if features.len() != class_indices.len() {
            return Err(TrainerError::Training(format!(
                "{} feature rows but {} class indices",
                features.len(),
                class_indices.len()
            )));
        }
        if let Some(&class) = class_indices.iter().find(|&&c| c >= class_count) {
            return Err(TrainerError::Training(format!(
                "class index {class} out of range for {class_count} classes"
            )));
        }

        let feature_count = features.first().map_or(0, Vec::len);
        if features.iter().any(|row| row.len() != feature_count) {
            return Err(TrainerError::Training(
                "feature rows have different widths".to_string(),
            ));
        }

        Ok(Self {
            config,
            features,
            class_indices,
            class_count,
            feature_count,
        })
    }

    /// Build tree from the rows listed in `sample`
    pub fn build<R: Rng>(&self, sample: &[usize], rng: &mut R) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(sample, 0, &mut nodes, rng);
        Tree::new(nodes)
    }

    /// Recursively build tree nodes in pre-order
    fn build_node<R: Rng>(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut R,
    ) -> i32 {
        let current_idx = nodes.len() as i32;
        let counts = self.class_counts(indices);
        let majority = majority_class(&counts);

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
            || pure
        {
            nodes.push(Node::leaf(current_idx, majority));
            return current_idx;
        }

        let split = match self.find_best_split(indices, rng) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(current_idx, majority));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve space for current node
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, rng);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, rng);

        let node = &mut nodes[current_idx as usize];
        node.left = left_idx;
        node.right = right_idx;

        current_idx
    }

    /// Find the best split among a random subset of informative features.
    ///
    /// Features are visited in random order; constant features do not count
    /// towards `max_features`, so a split is found whenever one exists.
    fn find_best_split<R: Rng>(&self, indices: &[usize], rng: &mut R) -> Option<SplitCandidate> {
        let wanted = self.config.max_features.resolve(self.feature_count);
        let mut visited = 0usize;
        let mut best: Option<SplitCandidate> = None;

        for feature_idx in feature_order(rng, self.feature_count) {
            if visited >= wanted && best.is_some() {
                break;
            }

            let mut column: Vec<(f32, usize)> = indices
                .iter()
                .map(|&i| (self.features[i][feature_idx] as f32, self.class_indices[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if column.first().map(|c| c.0) == column.last().map(|c| c.0) {
                continue;
            }
            visited += 1;

            if let Some(candidate) = self.best_split_for_feature(feature_idx, &column) {
                best = match best {
                    Some(current) if !candidate.beats(&current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        best
    }

    /// Sweep the sorted column once, scoring every boundary between
    /// distinct values.
    fn best_split_for_feature(
        &self,
        feature_idx: usize,
        column: &[(f32, usize)],
    ) -> Option<SplitCandidate> {
        let total = column.len();
        let mut right_counts = vec![0usize; self.class_count];
        for &(_, class) in column {
            right_counts[class] += 1;
        }
        let mut left_counts = vec![0usize; self.class_count];

        let mut best: Option<SplitCandidate> = None;

        for pos in 0..total - 1 {
            let (value, class) = column[pos];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let next_value = column[pos + 1].0;
            if value == next_value {
                continue;
            }

            let n_left = pos + 1;
            let n_right = total - n_left;
            if n_left < self.config.min_samples_leaf || n_right < self.config.min_samples_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / total as f64;

            let threshold = f64::from(midpoint(value, next_value));
            let candidate = SplitCandidate::new(feature_idx, threshold, impurity);

            best = match best {
                Some(current) if !candidate.beats(&current) => Some(current),
                _ => Some(candidate),
            };
        }

        best
    }

    /// Split samples based on threshold
    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .copied()
            .partition(|&idx| goes_left(self.features[idx][feature_idx], threshold))
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.class_count];
        for &idx in indices {
            counts[self.class_indices[idx]] += 1;
        }
        counts
    }
}

/// Gini impurity: 1 - Σ p²
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Halfway point between two distinct values.
///
/// Falls back to `low` when rounding would put the midpoint on `high`, so
/// `x <= threshold` still separates the two.
fn midpoint(low: f32, high: f32) -> f32 {
    let mid = low + (high - low) / 2.0;
    if mid >= high || !mid.is_finite() {
        low
    } else {
        mid
    }
}

/// Most frequent class; ties go to the lowest index
pub fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0usize;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    best
}
