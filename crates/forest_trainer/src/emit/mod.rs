//! Model-to-source code emission
//!
//! The emitter only knows the `TrainedModel` capability: render yourself as
//! source text for a target, given a class map. Rendering always completes
//! into a `String` before anything is written, so a failed render leaves
//! the output untouched.

mod cpp;
mod rust;

use clap::ValueEnum;
use rfport_core::{ClassMap, Forest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use tracing::info;

use crate::errors::{Result, TrainerError};

/// Default generated class name
pub const DEFAULT_CLASS_NAME: &str = "RandomForest";

/// Largest class count addressable by the generated `uint8_t` class index
pub const MAX_CLASSES: usize = u8::MAX as usize;

/// Largest ensemble whose votes fit the generated `uint16_t` counters
pub const MAX_TREES: usize = u16::MAX as usize;

/// Output language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmitTarget {
    /// Header-only C++ class for microcontrollers
    #[default]
    Cpp,
    /// Dependency-free Rust module
    Rust,
}

impl fmt::Display for EmitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitTarget::Cpp => write!(f, "cpp"),
            EmitTarget::Rust => write!(f, "rust"),
        }
    }
}

/// Rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct EmitOptions {
    pub target: EmitTarget,
    /// Name of the generated C++ class
    pub class_name: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            target: EmitTarget::default(),
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

/// A fitted model that can port itself to source code
pub trait TrainedModel {
    /// Short human-readable model family name
    fn kind(&self) -> &'static str;

    /// Whether `render` can produce code for `target`
    fn supports(&self, _target: EmitTarget) -> bool {
        true
    }

    /// Render the model's decision logic as source text
    fn render(&self, class_map: &ClassMap, options: &EmitOptions) -> Result<String>;
}

/// Render `model` and write the complete text to `writer`.
///
/// Returns the number of bytes written.
pub fn emit<M, W>(
    model: &M,
    class_map: &ClassMap,
    options: &EmitOptions,
    mut writer: W,
) -> Result<usize>
where
    M: TrainedModel + ?Sized,
    W: Write,
{
    if !model.supports(options.target) {
        return Err(TrainerError::UnsupportedModel(format!(
            "{} cannot be emitted as {}",
            model.kind(),
            options.target
        )));
    }

    let source = model.render(class_map, options)?;
    writer.write_all(source.as_bytes())?;
    writer.flush()?;

    info!(
        "Emitted {} bytes of {} for {}",
        source.len(),
        options.target,
        model.kind()
    );
    Ok(source.len())
}

impl TrainedModel for Forest {
    fn kind(&self) -> &'static str {
        "random forest"
    }

    fn render(&self, class_map: &ClassMap, options: &EmitOptions) -> Result<String> {
        self.validate()
            .map_err(|e| TrainerError::UnsupportedModel(e.to_string()))?;

        if self.num_classes() > MAX_CLASSES {
            return Err(TrainerError::UnsupportedModel(format!(
                "{} classes exceed the {} supported by generated code",
                self.num_classes(),
                MAX_CLASSES
            )));
        }
        if self.num_trees() > MAX_TREES {
            return Err(TrainerError::UnsupportedModel(format!(
                "{} trees exceed the {} supported by generated code",
                self.num_trees(),
                MAX_TREES
            )));
        }

        let labels = (0..self.num_classes())
            .map(|idx| class_map.label(idx).ok_or(TrainerError::MissingClassLabel(idx)))
            .collect::<Result<Vec<i64>>>()?;

        let source = match options.target {
            EmitTarget::Cpp => cpp::render_forest(self, &labels, &options.class_name),
            EmitTarget::Rust => rust::render_forest(self, &labels),
        };
        Ok(source)
    }
}

/// Indentation-aware line buffer
pub(crate) struct SourceWriter {
    buf: String,
    indent: usize,
    unit: &'static str,
}

impl SourceWriter {
    pub(crate) fn new(unit: &'static str) -> Self {
        Self {
            buf: String::new(),
            indent: 0,
            unit,
        }
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.buf.push_str(self.unit);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}

/// Literal for a split threshold.
///
/// The threshold is narrowed to the `f32` the generated code compares
/// against and printed exactly, so a C++ `double` literal and a Rust `f32`
/// literal both hold the same value. Always has a decimal point or exponent.
pub(crate) fn threshold_literal(threshold: f64) -> String {
    format!("{:?}", f64::from(threshold as f32))
}

/// Comment header shared by every target
pub(crate) fn describe(forest: &Forest) -> Vec<String> {
    vec![
        format!(
            "Random forest: {} trees, {} features, {} classes",
            forest.num_trees(),
            forest.feature_count,
            forest.num_classes()
        ),
        format!(
            "Trained with max_depth={} seed={} on {} rows",
            forest.metadata.max_depth, forest.metadata.seed, forest.metadata.training_rows
        ),
        format!("Model hash: {}", forest.metadata.model_hash),
    ]
}
