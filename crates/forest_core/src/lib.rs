//! Random forest model core
//!
//! Provides the model types shared by the trainer and the code emitter.
//!
//! Modules:
//! - `tree`: Flat-vector classification trees and traversal
//! - `forest`: Tree ensemble with majority-vote inference and hashing
//! - `class_map`: Class index → external label mapping
//! - `serialization`: Canonical JSON and BLAKE3 digests
//! - `errors`: Model error type

pub mod class_map;
pub mod errors;
pub mod forest;
pub mod serialization;
pub mod tree;

pub use class_map::ClassMap;
pub use errors::ModelError;
pub use forest::{Forest, ForestMetadata, FORMAT_VERSION};
pub use serialization::{hash_canonical_hex, to_canonical_json};
pub use tree::{goes_left, Node, Tree};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
