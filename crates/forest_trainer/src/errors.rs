use rfport_core::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the loader, splitter, trainer and emitter.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("column {index} out of range for a table with {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("row {row}, column {column}: cannot parse {value:?} as {expected}")]
    Parse {
        row: usize,
        column: usize,
        value: String,
        expected: &'static str,
    },

    #[error("training error: {0}")]
    Training(String),

    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("class map has no label for class index {0}")]
    MissingClassLabel(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
