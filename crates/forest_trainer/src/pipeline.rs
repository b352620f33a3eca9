//! Load → split → train → emit
//!
//! Each stage's success is the precondition for the next; nothing is
//! retried and nothing is written until the code has been fully rendered.

use rfport_core::Forest;
use std::io::Write;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::dataset::Table;
use crate::emit::emit;
use crate::errors::Result;
use crate::trainer::ForestTrainer;

/// Run the full pipeline against `config.input_path`, writing code to `writer`
pub fn run_pipeline<W: Write>(config: &PipelineConfig, writer: W) -> Result<Forest> {
    config.validate()?;

    info!("Loading dataset from: {}", config.input_path.display());
    let table = Table::from_csv(&config.input_path, config.delimiter_byte()?)?;

    run_pipeline_on_table(config, &table, writer)
}

/// Run split → train → emit on an already loaded table
pub fn run_pipeline_on_table<W: Write>(
    config: &PipelineConfig,
    table: &Table,
    writer: W,
) -> Result<Forest> {
    config.validate()?;

    info!(
        "Loaded {} rows with {} columns",
        table.row_count(),
        table.column_count()
    );

    let dataset = table.split(config.feature_columns, config.label_column)?;
    info!(
        "Split into {} features and label column {:?}",
        dataset.feature_count,
        table.headers[config.label_column]
    );
    for (name, stats) in dataset.feature_names.iter().zip(dataset.feature_stats()) {
        debug!("  {}: min={}, max={}", name, stats.min, stats.max);
    }

    let forest = ForestTrainer::new(config.forest_config()).train(&dataset)?;
    info!(
        "Training complete: {} trees, model hash {}",
        forest.num_trees(),
        forest.metadata.model_hash
    );

    emit(&forest, &config.class_map, &config.emit_options(), writer)?;

    if let Some(path) = &config.model_output {
        forest.save_json(path)?;
        info!("Saved model to: {}", path.display());
    }

    Ok(forest)
}
