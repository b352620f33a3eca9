//! rfport CLI
//!
//! Trains a random forest on a CSV table and prints the ported model
//! source to stdout. Runs with built-in defaults when given no arguments.

use anyhow::{Context, Result};
use clap::Parser;
use rfport_trainer::{run_pipeline, EmitTarget, PipelineConfig};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rfport")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a random forest and port it to embeddable source code", long_about = None)]
struct Args {
    /// TOML configuration file (fields not set keep their defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input CSV dataset path (header row, 14 feature columns, then label)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of trees
    #[arg(long)]
    trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Random seed for bootstrap and feature sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Output language
    #[arg(long, value_enum)]
    target: Option<EmitTarget>,

    /// Generated C++ class name
    #[arg(long)]
    class_name: Option<String>,

    /// Also save the trained model as canonical JSON
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(trees) = self.trees {
            config.n_estimators = trees;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(class_name) = self.class_name {
            config.class_name = class_name;
        }
        if let Some(model_out) = self.model_out {
            config.model_output = Some(model_out);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the generated code
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!("rfport v{}", env!("CARGO_PKG_VERSION"));

    let config = args.into_config()?;
    info!("Training configuration:");
    info!("  Input: {}", config.input_path.display());
    info!("  Trees: {}", config.n_estimators);
    info!("  Max depth: {}", config.max_depth);
    info!("  Seed: {}", config.seed);
    info!("  Target: {}", config.target);

    let stdout = io::stdout();
    run_pipeline(&config, stdout.lock()).context("Failed to port model")?;

    info!("✓ Done");
    Ok(())
}
