//! CSV table loading and feature/label splitting
//!
//! A `Table` keeps every cell as text; numbers are only parsed when the
//! table is split into a `Dataset`, so columns outside the feature and
//! label range may hold anything.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{Result, TrainerError};

/// Number of leading columns used as features
pub const FEATURE_COLUMNS: usize = 14;

/// Zero-based index of the label column (the 15th column)
pub const LABEL_COLUMN: usize = 14;

/// Raw delimited table with a header row
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Load a table from a CSV file.
    ///
    /// The first record is the header row; every following record must
    /// have the same number of fields.
    pub fn from_csv<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TrainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(file, delimiter)
    }

    /// Load a table from any reader (file-less variant of `from_csv`)
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(TrainerError::Dataset("missing header row".to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Err(TrainerError::Dataset("table has no data rows".to_string()));
        }

        Ok(Self { headers, rows })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Split into the first `feature_columns` columns as features and
    /// `label_column` as the label.
    ///
    /// Fails with `ColumnOutOfRange` rather than truncating when the table is
    /// narrower than requested.
    pub fn split(&self, feature_columns: usize, label_column: usize) -> Result<Dataset> {
        let columns = self.column_count();

        if feature_columns > columns {
            return Err(TrainerError::ColumnOutOfRange {
                index: feature_columns - 1,
                columns,
            });
        }
        if label_column >= columns {
            return Err(TrainerError::ColumnOutOfRange {
                index: label_column,
                columns,
            });
        }

        let mut features = Vec::with_capacity(self.rows.len());
        let mut labels = Vec::with_capacity(self.rows.len());

        for (row_idx, row) in self.rows.iter().enumerate() {
            if row.len() != columns {
                return Err(TrainerError::Dataset(format!(
                    "row {}: expected {} cells, got {}",
                    row_idx + 1,
                    columns,
                    row.len()
                )));
            }

            let mut row_features = Vec::with_capacity(feature_columns);
            for (col_idx, cell) in row.iter().take(feature_columns).enumerate() {
                row_features.push(parse_feature(cell, row_idx, col_idx)?);
            }

            features.push(row_features);
            labels.push(parse_label(&row[label_column], row_idx, label_column)?);
        }

        Dataset::new(
            features,
            labels,
            self.headers[..feature_columns].to_vec(),
        )
    }
}

fn parse_error(cell: &str, row_idx: usize, col_idx: usize, expected: &'static str) -> TrainerError {
    TrainerError::Parse {
        row: row_idx + 1,
        column: col_idx + 1,
        value: cell.to_string(),
        expected,
    }
}

/// Ported models read features as `f32`, so values must fit its range.
fn representable(value: f64) -> bool {
    value.is_finite() && (value as f32).is_finite()
}

fn parse_feature(cell: &str, row_idx: usize, col_idx: usize) -> Result<f64> {
    match cell.parse::<f64>() {
        Ok(value) if representable(value) => Ok(value),
        _ => Err(parse_error(
            cell,
            row_idx,
            col_idx,
            "a finite single-precision number",
        )),
    }
}

/// Labels may be written as integers or as integral floats ("1.0").
fn parse_label(cell: &str, row_idx: usize, col_idx: usize) -> Result<i64> {
    if let Ok(label) = cell.parse::<i64>() {
        return Ok(label);
    }

    match cell.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value <= i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(parse_error(cell, row_idx, col_idx, "an integer class label")),
    }
}

/// Per-feature value range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureStats {
    pub min: f64,
    pub max: f64,
}

/// Feature matrix and label vector ready for training
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<i64>,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset from in-memory rows.
    ///
    /// Every row must have `feature_names.len()` values and there must be
    /// exactly one label per row.
    pub fn new(
        features: Vec<Vec<f64>>,
        labels: Vec<i64>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(TrainerError::Dataset(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }

        let feature_count = feature_names.len();
        if let Some((i, row)) = features
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_count)
        {
            return Err(TrainerError::Dataset(format!(
                "row {}: expected {} features, got {}",
                i + 1,
                feature_count,
                row.len()
            )));
        }

        for (i, row) in features.iter().enumerate() {
            if let Some(value) = row.iter().find(|v| !representable(**v)) {
                return Err(TrainerError::Dataset(format!(
                    "row {}: feature value {} is outside single-precision range",
                    i + 1,
                    value
                )));
            }
        }

        Ok(Self {
            features,
            labels,
            feature_count,
            feature_names,
        })
    }

    /// Build a dataset with generated feature names `f1..fN`
    pub fn from_rows(features: Vec<Vec<f64>>, labels: Vec<i64>) -> Result<Self> {
        let width = features.first().map_or(0, Vec::len);
        let names = (1..=width).map(|i| format!("f{i}")).collect();
        Self::new(features, labels, names)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Distinct labels in ascending order
    pub fn classes(&self) -> Vec<i64> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    /// Get feature statistics for validation
    pub fn feature_stats(&self) -> Vec<FeatureStats> {
        let mut stats = vec![
            FeatureStats {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            };
            self.feature_count
        ];

        for row in &self.features {
            for (stat, &val) in stats.iter_mut().zip(row) {
                stat.min = stat.min.min(val);
                stat.max = stat.max.max(val);
            }
        }

        stats
    }
}
