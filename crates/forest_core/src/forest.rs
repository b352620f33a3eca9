//! Random forest model with deterministic majority-vote inference
//!
//! The forest owns its trees, the sorted list of class labels seen during
//! training and the feature width it expects. Model identity is the BLAKE3
//! digest of the canonical JSON of those three fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{ModelError, Result};
use crate::serialization::{hash_canonical_hex, to_canonical_json};
use crate::tree::Tree;

/// Current model format version
pub const FORMAT_VERSION: i32 = 1;

/// Training provenance recorded alongside the trees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ForestMetadata {
    /// Requested ensemble size
    pub n_estimators: usize,
    /// Requested per-tree depth limit
    pub max_depth: usize,
    /// Base seed used for bootstrap and feature sampling
    pub seed: u64,
    /// Number of rows the forest was fitted on
    pub training_rows: usize,
    /// Hex BLAKE3 digest of the structural fields
    pub model_hash: String,
}

/// An ensemble of classification trees voting on a class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forest {
    pub version: i32,

    /// Decision trees in the ensemble
    pub trees: Vec<Tree>,

    /// Distinct training labels in ascending order; leaf values index this list
    pub classes: Vec<i64>,

    /// Width of the feature vectors the trees were trained on
    pub feature_count: usize,

    pub metadata: ForestMetadata,
}

/// Fields that define the model's behaviour; metadata is excluded so the
/// hash does not depend on itself.
#[derive(Serialize)]
struct HashedForest<'a> {
    version: i32,
    trees: &'a [Tree],
    classes: &'a [i64],
    feature_count: usize,
}

impl Forest {
    /// Create a forest and stamp its model hash into the metadata
    pub fn new(
        trees: Vec<Tree>,
        classes: Vec<i64>,
        feature_count: usize,
        metadata: ForestMetadata,
    ) -> Result<Self> {
        let mut forest = Self {
            version: FORMAT_VERSION,
            trees,
            classes,
            feature_count,
            metadata,
        };
        forest.metadata.model_hash = forest.hash_hex()?;
        Ok(forest)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.trees.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Forest has no trees".to_string(),
            ));
        }

        if self.classes.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Forest has no classes".to_string(),
            ));
        }

        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelError::ValidationFailed(
                "Classes must be strictly ascending".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count, self.classes.len())
                .map_err(|e| {
                    ModelError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
                })?;
        }

        Ok(())
    }

    /// Count one vote per tree for each class index.
    ///
    /// Trees that cannot be evaluated on `features` abstain.
    pub fn votes(&self, features: &[f64]) -> Vec<u32> {
        let mut votes = vec![0u32; self.classes.len()];

        for tree in &self.trees {
            if let Some(class_idx) = tree.evaluate(features) {
                if let Some(slot) = votes.get_mut(class_idx) {
                    *slot += 1;
                }
            }
        }

        votes
    }

    /// Predict the winning class index by hard majority vote.
    ///
    /// Ties resolve to the lowest class index, matching the emitted code.
    pub fn predict(&self, features: &[f64]) -> Option<usize> {
        let votes = self.votes(features);
        let mut best: Option<(usize, u32)> = None;

        for (idx, &count) in votes.iter().enumerate() {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((idx, count)),
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Predict and translate the class index back to its training label
    pub fn predict_label(&self, features: &[f64]) -> Option<i64> {
        self.predict(features)
            .and_then(|idx| self.classes.get(idx).copied())
    }

    fn hashed_view(&self) -> HashedForest<'_> {
        HashedForest {
            version: self.version,
            trees: &self.trees,
            classes: &self.classes,
            feature_count: self.feature_count,
        }
    }

    /// Compute model hash as hex string
    pub fn hash_hex(&self) -> Result<String> {
        hash_canonical_hex(&self.hashed_view())
    }

    /// Serialize the full model (metadata included) to canonical JSON
    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// Save model to JSON file with canonical serialization
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_canonical_json()?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load model from JSON file, validating structure and hash
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let model: Forest = serde_json::from_str(&json)?;
        model.validate()?;

        let actual = model.hash_hex()?;
        if actual != model.metadata.model_hash {
            return Err(ModelError::ValidationFailed(format!(
                "Model hash mismatch: recorded {}, computed {}",
                model.metadata.model_hash, actual
            )));
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn create_test_forest() -> Forest {
        // x[0] <= 0.5 → class 0, else class 1
        let tree1 = Tree::new(vec![
            Node::internal(0, 0, 0.5, 1, 2),
            Node::leaf(1, 0),
            Node::leaf(2, 1),
        ]);
        // x[1] <= 3.0 → class 0, else class 1
        let tree2 = Tree::new(vec![
            Node::internal(0, 1, 3.0, 1, 2),
            Node::leaf(1, 0),
            Node::leaf(2, 1),
        ]);
        let tree3 = Tree::new(vec![Node::leaf(0, 1)]);

        Forest::new(
            vec![tree1, tree2, tree3],
            vec![0, 1],
            2,
            ForestMetadata::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_forest_creation() {
        let forest = create_test_forest();
        assert_eq!(forest.num_trees(), 3);
        assert_eq!(forest.num_classes(), 2);
        assert_eq!(forest.metadata.model_hash.len(), 64);
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn test_majority_vote() {
        let forest = create_test_forest();

        assert_eq!(forest.votes(&[0.1, 1.0]), vec![2, 1]);
        assert_eq!(forest.predict(&[0.1, 1.0]), Some(0));

        assert_eq!(forest.votes(&[0.9, 1.0]), vec![1, 2]);
        assert_eq!(forest.predict(&[0.9, 1.0]), Some(1));
        assert_eq!(forest.predict_label(&[0.9, 9.0]), Some(1));
    }

    #[test]
    fn test_tie_goes_to_lowest_class() {
        let forest = Forest::new(
            vec![
                Tree::new(vec![Node::leaf(0, 1)]),
                Tree::new(vec![Node::leaf(0, 0)]),
            ],
            vec![4, 9],
            1,
            ForestMetadata::default(),
        )
        .unwrap();

        assert_eq!(forest.predict(&[0.0]), Some(0));
        assert_eq!(forest.predict_label(&[0.0]), Some(4));
    }

    #[test]
    fn test_hash_ignores_metadata() {
        let forest = create_test_forest();
        let mut other = forest.clone();
        other.metadata.seed = 99;
        assert_eq!(forest.hash_hex().unwrap(), other.hash_hex().unwrap());

        other.trees.pop();
        assert_ne!(forest.hash_hex().unwrap(), other.hash_hex().unwrap());
    }

    #[test]
    fn test_model_validation() {
        let mut invalid = create_test_forest();
        invalid.version = 999;
        assert!(invalid.validate().is_err());

        let mut invalid = create_test_forest();
        invalid.classes = vec![1, 0];
        assert!(invalid.validate().is_err());

        let mut invalid = create_test_forest();
        invalid.trees.clear();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_save_load_json() {
        use tempfile::NamedTempFile;

        let forest = create_test_forest();
        let temp_file = NamedTempFile::new().unwrap();

        forest.save_json(temp_file.path()).unwrap();
        let loaded = Forest::load_json(temp_file.path()).unwrap();

        assert_eq!(forest, loaded);
    }

    #[test]
    fn test_load_rejects_tampered_model() {
        use tempfile::NamedTempFile;

        let mut forest = create_test_forest();
        forest.trees[0].nodes[0].threshold = 0.75;
        let temp_file = NamedTempFile::new().unwrap();
        forest.save_json(temp_file.path()).unwrap();

        assert!(Forest::load_json(temp_file.path()).is_err());
    }
}
