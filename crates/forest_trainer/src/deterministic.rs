//! Deterministic utilities for reproducible training
//!
//! Every tree draws from its own ChaCha8 stream derived from the base seed,
//! so the forest depends only on (data, config, seed) and never on the
//! order in which trees are built.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Per-tree RNG: stream `tree_idx` of the base seed
pub fn tree_rng(seed: u64, tree_idx: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(tree_idx as u64))
}

/// Draw `n` row indices from `0..n` with replacement
pub fn bootstrap_indices<R: Rng>(rng: &mut R, n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Random visiting order over all features
pub fn feature_order<R: Rng>(rng: &mut R, feature_count: usize) -> Vec<usize> {
    index::sample(rng, feature_count, feature_count).into_vec()
}

/// Strategy for the number of candidate features per split
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Square root of n_features
    #[default]
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fixed number (clamped to n_features)
    Fixed(usize),
    /// All features
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete count in `1..=feature_count`
    pub fn resolve(&self, feature_count: usize) -> usize {
        let n = match *self {
            MaxFeatures::Sqrt => (feature_count as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (feature_count as f64).log2().floor() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => feature_count,
        };
        n.clamp(1, feature_count.max(1))
    }
}

/// Deterministic tie-breaker for split selection
///
/// Orders candidates by feature index, then by threshold.
#[derive(Debug, Clone, Copy)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold: f64,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold: f64) -> Self {
        Self {
            feature_idx,
            threshold,
        }
    }
}

impl PartialEq for SplitTieBreaker {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SplitTieBreaker {}

impl PartialOrd for SplitTieBreaker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SplitTieBreaker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.feature_idx
            .cmp(&other.feature_idx)
            .then_with(|| self.threshold.total_cmp(&other.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_rng_determinism() {
        let mut rng1 = tree_rng(42, 3);
        let mut rng2 = tree_rng(42, 3);

        for _ in 0..100 {
            assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
        }
    }

    #[test]
    fn test_tree_streams_differ() {
        let mut rng0 = tree_rng(42, 0);
        let mut rng1 = tree_rng(42, 1);
        let a: Vec<u64> = (0..4).map(|_| rng0.gen()).collect();
        let b: Vec<u64> = (0..4).map(|_| rng1.gen()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_bootstrap_range() {
        let mut rng = tree_rng(7, 0);
        let sample = bootstrap_indices(&mut rng, 10);
        assert_eq!(sample.len(), 10);
        assert!(sample.iter().all(|&i| i < 10));
        assert!(bootstrap_indices(&mut rng, 0).is_empty());
    }

    #[test]
    fn test_feature_order_is_permutation() {
        let mut rng = tree_rng(7, 0);
        let mut order = feature_order(&mut rng, 14);
        order.sort_unstable();
        assert_eq!(order, (0..14).collect::<Vec<_>>());
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(14), 3);
        assert_eq!(MaxFeatures::Log2.resolve(14), 3);
        assert_eq!(MaxFeatures::Fixed(20).resolve(14), 14);
        assert_eq!(MaxFeatures::Fixed(0).resolve(14), 1);
        assert_eq!(MaxFeatures::All.resolve(14), 14);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }

    #[test]
    fn test_tie_breaker_ordering() {
        let t1 = SplitTieBreaker::new(0, 1.5);
        let t2 = SplitTieBreaker::new(0, 2.5);
        let t3 = SplitTieBreaker::new(1, -4.0);

        assert!(t1 < t2);
        assert!(t2 < t3);
        assert_eq!(t1, SplitTieBreaker::new(0, 1.5));
    }
}
