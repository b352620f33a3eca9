//! rfport trainer - random forest training and code emission
//!
//! Loads a CSV table, splits it into features and labels, fits a seeded
//! random forest and ports the result to embeddable source code.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod emit;
pub mod errors;
pub mod pipeline;
pub mod trainer;

pub use config::{PipelineConfig, DEFAULT_INPUT_PATH};
pub use dataset::{Dataset, FeatureStats, Table, FEATURE_COLUMNS, LABEL_COLUMN};
pub use deterministic::{MaxFeatures, SplitTieBreaker};
pub use emit::{emit, EmitOptions, EmitTarget, TrainedModel};
pub use errors::{Result, TrainerError};
pub use pipeline::{run_pipeline, run_pipeline_on_table};
pub use trainer::{ForestConfig, ForestTrainer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
