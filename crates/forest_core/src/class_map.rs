//! Mapping from internal class indices to external labels

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Class index → label used to annotate emitted code.
///
/// Keys are the positions of classes in the model's sorted class list;
/// values are what the generated `idxToLabel` returns for them. Serialized
/// as a list of `[index, label]` pairs so it survives TOML, whose tables
/// only allow string keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<(usize, i64)>", into = "Vec<(usize, i64)>")]
pub struct ClassMap(BTreeMap<usize, i64>);

impl ClassMap {
    /// Identity map over `0..class_count`
    pub fn identity(class_count: usize) -> Self {
        Self((0..class_count).map(|i| (i, i as i64)).collect())
    }

    /// Map each class index to the raw label value it was trained on
    pub fn from_classes(classes: &[i64]) -> Self {
        Self(classes.iter().copied().enumerate().collect())
    }

    pub fn label(&self, class_idx: usize) -> Option<i64> {
        self.0.get(&class_idx).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }
}

impl Default for ClassMap {
    /// Binary identity map `{0: 0, 1: 1}`
    fn default() -> Self {
        Self::identity(2)
    }
}

impl From<Vec<(usize, i64)>> for ClassMap {
    fn from(pairs: Vec<(usize, i64)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<ClassMap> for Vec<(usize, i64)> {
    fn from(map: ClassMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl FromIterator<(usize, i64)> for ClassMap {
    fn from_iter<I: IntoIterator<Item = (usize, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_binary_identity() {
        let map = ClassMap::default();
        assert_eq!(map.len(), 2);
        assert_eq!(map.label(0), Some(0));
        assert_eq!(map.label(1), Some(1));
        assert_eq!(map.label(2), None);
    }

    #[test]
    fn test_from_classes() {
        let map = ClassMap::from_classes(&[3, 7]);
        assert_eq!(map.label(0), Some(3));
        assert_eq!(map.label(1), Some(7));
    }

    #[test]
    fn test_iteration_is_ordered() {
        let map: ClassMap = [(2, 20), (0, 0), (1, 10)].into_iter().collect();
        let keys: Vec<usize> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }

    #[test]
    fn test_serializes_as_pairs() {
        let json = serde_json::to_string(&ClassMap::default()).unwrap();
        assert_eq!(json, "[[0,0],[1,1]]");

        let back: ClassMap = serde_json::from_str("[[1,5],[0,4]]").unwrap();
        assert_eq!(back.label(0), Some(4));
        assert_eq!(back.label(1), Some(5));
    }
}
