//! Pipeline configuration
//!
//! Every knob has a built-in default so the tool runs with no arguments.
//! A TOML file may override any subset of fields.

use rfport_core::ClassMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::{FEATURE_COLUMNS, LABEL_COLUMN};
use crate::deterministic::MaxFeatures;
use crate::emit::{EmitOptions, EmitTarget, DEFAULT_CLASS_NAME};
use crate::errors::{Result, TrainerError};
use crate::trainer::{ForestConfig, DEFAULT_MAX_DEPTH, DEFAULT_N_ESTIMATORS, DEFAULT_SEED};

/// Default training table location
pub const DEFAULT_INPUT_PATH: &str = "chest TD.csv";

/// Configuration for one train-and-emit run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// CSV file to train on
    pub input_path: PathBuf,
    /// Field delimiter (single ASCII character)
    pub delimiter: char,
    /// Number of leading columns used as features
    pub feature_columns: usize,
    /// Zero-based label column
    pub label_column: usize,
    /// Ensemble size
    pub n_estimators: usize,
    /// Per-tree depth limit
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Base seed for sampling
    pub seed: u64,
    /// Class index → label used by the emitted code
    pub class_map: ClassMap,
    pub target: EmitTarget,
    /// Generated C++ class name
    pub class_name: String,
    /// Optional path for the canonical JSON model artifact
    pub model_output: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            delimiter: ',',
            feature_columns: FEATURE_COLUMNS,
            label_column: LABEL_COLUMN,
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: DEFAULT_SEED,
            class_map: ClassMap::default(),
            target: EmitTarget::Cpp,
            class_name: DEFAULT_CLASS_NAME.to_string(),
            model_output: None,
        }
    }
}

impl PipelineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TrainerError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| TrainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Serialize configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TrainerError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check cross-field constraints before any work starts
    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;

        if self.label_column < self.feature_columns {
            return Err(TrainerError::Config(format!(
                "label column {} overlaps the first {} feature columns",
                self.label_column, self.feature_columns
            )));
        }

        if self.class_map.is_empty() {
            return Err(TrainerError::Config("class map is empty".to_string()));
        }

        if !is_identifier(&self.class_name) {
            return Err(TrainerError::Config(format!(
                "class name {:?} is not a valid identifier",
                self.class_name
            )));
        }

        self.forest_config()
            .validate()
            .map_err(|e| TrainerError::Config(e.to_string()))
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r')
            .ok_or_else(|| {
                TrainerError::Config(format!("unsupported delimiter {:?}", self.delimiter))
            })
    }

    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            bootstrap: self.bootstrap,
            seed: self.seed,
        }
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            target: self.target,
            class_name: self.class_name.clone(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
