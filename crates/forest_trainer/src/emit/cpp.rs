//! Header-only C++ port in the `Eloquent::ML::Port` layout used by
//! Arduino-style sketches.

use rfport_core::{Forest, Tree};

use super::{describe, threshold_literal, SourceWriter};

pub(super) fn render_forest(forest: &Forest, labels: &[i64], class_name: &str) -> String {
    let n_classes = forest.num_classes();
    let vote_type = if forest.num_trees() <= u8::MAX as usize {
        "uint8_t"
    } else {
        "uint16_t"
    };

    let mut w = SourceWriter::new("    ");
    w.line("#pragma once");
    w.line("#include <cstdarg>");
    w.line("#include <stdint.h>");
    w.blank();
    for line in describe(forest) {
        w.line(format!("// {line}"));
    }
    w.blank();

    w.line("namespace Eloquent {");
    w.indent();
    w.line("namespace ML {");
    w.indent();
    w.line("namespace Port {");
    w.indent();
    w.line(format!("class {class_name} {{"));
    w.indent();
    w.line("public:");
    w.indent();

    // predict
    w.line("/**");
    w.line("* Predict class for features vector");
    w.line("*/");
    w.line("int predict(float *x) {");
    w.indent();
    w.line(format!("{vote_type} votes[{n_classes}] = {{ 0 }};"));
    for (i, tree) in forest.trees.iter().enumerate() {
        w.line(format!("// tree #{}", i + 1));
        render_node(&mut w, tree, 0);
    }
    w.line("// return argmax of votes");
    w.line("uint8_t classIdx = 0;");
    w.line(format!("{vote_type} maxVotes = votes[0];"));
    w.blank();
    w.line(format!("for (uint8_t i = 1; i < {n_classes}; i++) {{"));
    w.indent();
    w.line("if (votes[i] > maxVotes) {");
    w.indent();
    w.line("classIdx = i;");
    w.line("maxVotes = votes[i];");
    w.dedent();
    w.line("}");
    w.dedent();
    w.line("}");
    w.blank();
    w.line("return classIdx;");
    w.dedent();
    w.line("}");
    w.blank();

    // predictLabel
    w.line("/**");
    w.line("* Predict readable class name");
    w.line("*/");
    w.line("const char* predictLabel(float *x) {");
    w.indent();
    w.line("return idxToLabel(predict(x));");
    w.dedent();
    w.line("}");
    w.blank();

    // idxToLabel
    w.line("/**");
    w.line("* Convert class idx to readable name");
    w.line("*/");
    w.line("const char* idxToLabel(uint8_t classIdx) {");
    w.indent();
    w.line("switch (classIdx) {");
    w.indent();
    for (idx, label) in labels.iter().enumerate() {
        w.line(format!("case {idx}:"));
        w.line(format!("return \"{label}\";"));
    }
    w.line("default:");
    w.line("return \"Houston we have a problem\";");
    w.dedent();
    w.line("}");
    w.dedent();
    w.line("}");

    w.dedent();
    w.line("protected:");
    w.dedent();
    w.line("};");
    w.dedent();
    w.line("}");
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
        "if (x[{}] <= {}) {{",
        node.feature_idx,
        threshold_literal(node.threshold)
    ));
    w.indent();
    render_node(w, tree, node.left as usize);
    w.dedent();
    w.line("}");
    w.blank();
    w.line("else {");
    w.indent();
    render_node(w, tree, node.right as usize);
    w.dedent();
    w.line("}");
    w.blank();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::tests::sample_forest;

    #[test]
    fn test_cpp_structure() {
        let forest = sample_forest();
        let code = render_forest(&forest, &[0, 1], "RandomForest");

        assert!(code.starts_with("#pragma once\n"));
        assert!(code.contains("class RandomForest {"));
        assert!(code.contains("int predict(float *x) {"));
        assert!(code.contains("uint8_t votes[2] = { 0 };"));
        assert!(code.contains("// tree #1"));
        assert!(code.contains("// tree #2"));
        assert!(code.contains("if (x[3] <= 0.5) {"));
        assert!(code.contains("if (x[0] <= 2.25) {"));
        assert!(code.contains("votes[1] += 1;"));
        assert!(code.contains(&format!("// Model hash: {}", forest.metadata.model_hash)));
    }

    #[test]
    fn test_cpp_labels() {
        let code = render_forest(&sample_forest(), &[10, 20], "Chest");

        assert!(code.contains("class Chest {"));
        assert!(code.contains("case 0:\n"));
        assert!(code.contains("return \"10\";"));
        assert!(code.contains("case 1:\n"));
        assert!(code.contains("return \"20\";"));
    }

    #[test]
    fn test_cpp_braces_balance() {
        let code = render_forest(&sample_forest(), &[0, 1], "RandomForest");
        let open = code.matches('{').count();
        let close = code.matches('}').count();
        assert_eq!(open, close);
    }
}
