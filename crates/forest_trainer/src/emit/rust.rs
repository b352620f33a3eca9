//! Dependency-free Rust port: one `predict` function plus label lookup.

use rfport_core::{Forest, Tree};

use super::{describe, threshold_literal, SourceWriter};

pub(super) fn render_forest(forest: &Forest, labels: &[i64]) -> String {
    let mut w = SourceWriter::new("    ");
    for line in describe(forest) {
        w.line(format!("// {line}"));
    }
    w.blank();

    w.line(format!("pub const N_CLASSES: usize = {};", forest.num_classes()));
    w.line(format!("pub const N_FEATURES: usize = {};", forest.feature_count));
    w.blank();

    w.line("/// Predict the class index for a feature vector of length `N_FEATURES`");
    w.line("pub fn predict(x: &[f32]) -> usize {");
    w.indent();
    w.line("let mut votes = [0u32; N_CLASSES];");
    for (i, tree) in forest.trees.iter().enumerate() {
        w.line(format!("// tree #{}", i + 1));
        render_node(&mut w, tree, 0);
    }
    w.blank();
    w.line("let mut class_idx = 0;");
    w.line("for i in 1..N_CLASSES {");
    w.indent();
    w.line("if votes[i] > votes[class_idx] {");
    w.indent();
    w.line("class_idx = i;");
    w.dedent();
    w.line("}");
    w.dedent();
    w.line("}");
    w.line("class_idx");
    w.dedent();
    w.line("}");
    w.blank();

    w.line("/// Predict the class label for a feature vector");
    w.line("pub fn predict_label(x: &[f32]) -> &'static str {");
    w.indent();
    w.line("idx_to_label(predict(x))");
    w.dedent();
    w.line("}");
    w.blank();

    w.line("/// Convert a class index to its label");
    w.line("pub fn idx_to_label(class_idx: usize) -> &'static str {");
    w.indent();
    w.line("match class_idx {");
    w.indent();
    for (idx, label) in labels.iter().enumerate() {
        w.line(format!("{idx} => \"{label}\","));
    }
    w.line("_ => \"unknown\",");
    w.dedent();
    w.line("}");
    w.dedent();
    w.line("}");

    w.finish()
}

fn render_node(w: &mut SourceWriter, tree: &Tree, idx: usize) {
    let node = &tree.nodes[idx];

    if let Some(class_idx) = node.leaf {
        w.line(format!("votes[{class_idx}] += 1;"));
        return;
    }

    w.line(format!(
        "if x[{}] <= {} {{",
        node.feature_idx,
        threshold_literal(node.threshold)
    ));
    w.indent();
    render_node(w, tree, node.left as usize);
    w.dedent();
    w.line("} else {");
    w.indent();
    render_node(w, tree, node.right as usize);
    w.dedent();
    w.line("}");
}
