//! Canonical JSON serialization for deterministic hashing
//!
//! Object keys are sorted recursively and no whitespace is emitted, so the
//! same model always produces the same bytes and therefore the same BLAKE3
//! digest.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{ModelError, Result};

/// Recursively sort JSON object keys to obtain a canonical representation.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, val) in entries {
                sorted.insert(key, canonicalize(val));
            }

            Value::Object(sorted)
        }
        Value::Array(elements) => Value::Array(elements.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).map_err(|e| ModelError::CanonicalError(e.to_string()))?;
    Ok(serde_json::to_string(&canonicalize(json_value))?)
}

/// Compute the BLAKE3 digest of a value's canonical JSON
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<[u8; 32]> {
    let json = to_canonical_json(value)?;
    Ok(*blake3::hash(json.as_bytes()).as_bytes())
}

/// Compute the BLAKE3 digest and return it hex-encoded
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String> {
    Ok(hex::encode(hash_canonical(value)?))
}
