//! Random forest trainer
//!
//! Fits `n_estimators` CART trees, each on its own bootstrap sample and
//! RNG stream, and packages them as a `Forest`.

use rfport_core::{Forest, ForestMetadata};
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::deterministic::{bootstrap_indices, tree_rng, MaxFeatures};
use crate::errors::{Result, TrainerError};

/// Default ensemble size
pub const DEFAULT_N_ESTIMATORS: usize = 30;

/// Default per-tree depth limit
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default base seed
pub const DEFAULT_SEED: u64 = 42;

/// Random forest training configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl ForestConfig {
    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(TrainerError::Training(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(TrainerError::Training(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainerError::Training(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(TrainerError::Training(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Random forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Train a random forest on the given dataset
    pub fn train(&self, dataset: &Dataset) -> Result<Forest> {
        self.config.validate()?;

        if dataset.is_empty() {
            return Err(TrainerError::Training("dataset is empty".to_string()));
        }
        if dataset.feature_count == 0 {
            return Err(TrainerError::Training(
                "dataset has no feature columns".to_string(),
            ));
        }

        let classes = dataset.classes();
        if classes.len() < 2 {
            return Err(TrainerError::Training(format!(
                "degenerate label set: need at least 2 distinct classes, found {:?}",
                classes
            )));
        }

        let class_indices = self.encode_labels(&dataset.labels, &classes)?;
        let n_samples = dataset.len();

        info!(
            "Training {} trees (max depth {}, {} candidate features per split) on {} samples, {} classes",
            self.config.n_estimators,
            self.config.max_depth,
            self.config.max_features.resolve(dataset.feature_count),
            n_samples,
            classes.len()
        );

        let builder = CartBuilder::new(
            &dataset.features,
            &class_indices,
            classes.len(),
            self.config.tree_config(),
        )?;

        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for tree_idx in 0..self.config.n_estimators {
            let mut rng = tree_rng(self.config.seed, tree_idx);

            let sample = if self.config.bootstrap {
                bootstrap_indices(&mut rng, n_samples)
            } else {
                (0..n_samples).collect()
            };

            let tree = builder.build(&sample, &mut rng);
            debug!(
                "Tree {}/{}: {} nodes, {} leaves, depth {}",
                tree_idx + 1,
                self.config.n_estimators,
                tree.nodes.len(),
                tree.leaf_count(),
                tree.depth()
            );

            trees.push(tree);
        }

        let metadata = ForestMetadata {
            n_estimators: self.config.n_estimators,
            max_depth: self.config.max_depth,
            seed: self.config.seed,
            training_rows: n_samples,
            model_hash: String::new(),
        };

        let forest = Forest::new(trees, classes, dataset.feature_count, metadata)?;
        Ok(forest)
    }

    /// Map each label to its position in the sorted class list
    fn encode_labels(&self, labels: &[i64], classes: &[i64]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                classes.binary_search(label).map_err(|_| {
                    TrainerError::Training(format!("label {label} missing from class list"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_simple_dataset() -> Dataset {
        Dataset::from_rows(
            vec![
                vec![0.1, 1.0],
                vec![0.2, 1.5],
                vec![0.3, 0.5],
                vec![4.0, 1.1],
                vec![4.5, 0.9],
                vec![5.0, 1.2],
            ],
            vec![0, 0, 0, 1, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_train_simple_model() -> Result<()> {
        let dataset = create_simple_dataset();
        let config = ForestConfig {
            n_estimators: 5,
            max_depth: 3,
            ..ForestConfig::default()
        };

        let forest = ForestTrainer::new(config).train(&dataset)?;

        assert_eq!(forest.num_trees(), 5);
        assert_eq!(forest.classes, vec![0, 1]);
        assert_eq!(forest.feature_count, 2);
        assert_eq!(forest.metadata.training_rows, 6);
        assert!(forest.validate().is_ok());
        assert!(forest.trees.iter().all(|t| t.depth() <= 3));

        Ok(())
    }

    #[test]
    fn test_fits_separable_data() -> Result<()> {
        let dataset = create_simple_dataset();
        let config = ForestConfig {
            bootstrap: false,
            max_features: MaxFeatures::All,
            n_estimators: 3,
            ..ForestConfig::default()
        };

        let forest = ForestTrainer::new(config).train(&dataset)?;
        for (row, &label) in dataset.features.iter().zip(&dataset.labels) {
            assert_eq!(forest.predict_label(row), Some(label));
        }

        Ok(())
    }

    #[test]
    fn test_determinism() -> Result<()> {
        let dataset = create_simple_dataset();
        let config = ForestConfig {
            n_estimators: 8,
            seed: 7,
            ..ForestConfig::default()
        };

        let model1 = ForestTrainer::new(config.clone()).train(&dataset)?;
        let model2 = ForestTrainer::new(config).train(&dataset)?;

        assert_eq!(model1, model2);
        assert_eq!(model1.metadata.model_hash, model2.metadata.model_hash);

        Ok(())
    }

    #[test]
    fn test_non_contiguous_labels() -> Result<()> {
        let dataset = Dataset::from_rows(
            vec![vec![1.0], vec![2.0], vec![9.0], vec![10.0]],
            vec![-3, -3, 7, 7],
        )?;
        let config = ForestConfig {
            bootstrap: false,
            n_estimators: 1,
            ..ForestConfig::default()
        };

        let forest = ForestTrainer::new(config).train(&dataset)?;
        assert_eq!(forest.classes, vec![-3, 7]);
        assert_eq!(forest.predict_label(&[1.5]), Some(-3));
        assert_eq!(forest.predict_label(&[9.5]), Some(7));

        Ok(())
    }

    #[test]
    fn test_degenerate_labels() {
        let dataset = Dataset::from_rows(vec![vec![1.0], vec![2.0]], vec![1, 1]).unwrap();
        let err = ForestTrainer::new(ForestConfig::default())
            .train(&dataset)
            .unwrap_err();
        assert!(matches!(err, TrainerError::Training(_)));
    }

    #[test]
    fn test_invalid_config() {
        let dataset = create_simple_dataset();

        for config in [
            ForestConfig {
                n_estimators: 0,
                ..ForestConfig::default()
            },
            ForestConfig {
                max_depth: 0,
                ..ForestConfig::default()
            },
            ForestConfig {
                min_samples_leaf: 0,
                ..ForestConfig::default()
            },
        ] {
            assert!(matches!(
                ForestTrainer::new(config).train(&dataset),
                Err(TrainerError::Training(_))
            ));
        }
    }
}
