//! Decision tree structures for random forest inference
//!
//! Nodes live in a flat vector with node 0 as the root. Internal nodes
//! send a sample left when `x[feature] <= threshold`; leaves carry the
//! index of the class they vote for.
//!
//! Ported models read `float` inputs, so every split comparison happens in
//! single precision. Training and inference use [`goes_left`] to make the
//! same decision the generated code makes.

use serde::{Deserialize, Serialize};

/// Split decision: both sides are narrowed to `f32`, equal goes left.
pub fn goes_left(value: f64, threshold: f64) -> bool {
    (value as f32) <= (threshold as f32)
}

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0`: index into feature vector
/// - `left` and `right` point to child node indices
/// - `leaf` is `None`
///
/// For leaf nodes:
/// - `feature_idx == -1`
/// - `leaf` contains the voted class index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold
    pub threshold: f64,

    /// Class index (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<usize>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a new leaf node voting for `class_idx`
    pub fn leaf(id: i32, class_idx: usize) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(class_idx),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }

    pub fn class_index(&self) -> Option<usize> {
        self.leaf
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk the tree for one feature vector and return the voted class index.
    ///
    /// Returns `None` when the structure is broken or the feature vector is
    /// too short for a split encountered on the path.
    pub fn evaluate(&self, features: &[f64]) -> Option<usize> {
        let mut idx = 0usize;

        loop {
            let node = self.nodes.get(idx)?;

            if node.is_leaf() {
                return node.class_index();
            }

            let feature_value = *features.get(usize::try_from(node.feature_idx).ok()?)?;

            let next = if goes_left(feature_value, node.threshold) {
                node.left
            } else {
                node.right
            };

            idx = usize::try_from(next).ok()?;
        }
    }

    /// Depth of the deepest leaf (a single leaf tree has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize, depth: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    let left = walk(nodes, node.left as usize, depth + 1);
                    let right = walk(nodes, node.right as usize, depth + 1);
                    left.max(right)
                }
                _ => depth,
            }
        }

        if self.nodes.is_empty() {
            return 0;
        }
        walk(&self.nodes, 0, 0)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Validate tree structure against the number of features and classes
    /// the owning model declares.
    pub fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    None => return Err(format!("Leaf node {i} has no class index")),
                    Some(class_idx) if class_idx >= class_count => {
                        return Err(format!(
                            "Leaf node {i} votes for class {class_idx}, model has {class_count} classes"
                        ));
                    }
                    Some(_) => {}
                }
                continue;
            }

            // Children must point forward to keep traversal acyclic
            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }

            if !(node.threshold as f32).is_finite() {
                return Err(format!(
                    "Internal node {i} threshold {} is outside single-precision range",
                    node.threshold
                ));
            }
        }

        Ok(())
    }
}
