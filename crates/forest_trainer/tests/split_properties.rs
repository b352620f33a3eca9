use proptest::prelude::*;
use rfport_trainer::{Table, TrainerError, FEATURE_COLUMNS, LABEL_COLUMN};

// Property-based tests for the feature/label splitter

fn arbitrary_table(min_cols: usize, max_cols: usize) -> impl Strategy<Value = Table> {
    (1usize..40, min_cols..=max_cols).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(
            prop::collection::vec(-1.0e6f64..1.0e6, cols),
            rows,
        )
        .prop_map(move |values| Table {
            headers: (0..cols).map(|c| format!("c{c}")).collect(),
            rows: values
                .into_iter()
                .enumerate()
                .map(|(r, row)| {
                    row.into_iter()
                        .enumerate()
                        .map(|(c, v)| {
                            if c == LABEL_COLUMN {
                                (r % 2).to_string()
                            } else {
                                v.to_string()
                            }
                        })
                        .collect()
                })
                .collect(),
        })
    })
}

proptest! {
    #[test]
    fn split_shape_matches_table(table in arbitrary_table(15, 20)) {
        let dataset = table.split(FEATURE_COLUMNS, LABEL_COLUMN).unwrap();

        prop_assert_eq!(dataset.len(), table.row_count());
        prop_assert_eq!(dataset.labels.len(), table.row_count());
        prop_assert_eq!(dataset.feature_count, 14);
        prop_assert!(dataset.features.iter().all(|row| row.len() == 14));
    }
}

proptest! {
    #[test]
    fn narrow_tables_are_rejected(table in arbitrary_table(1, 14)) {
        let result = table.split(FEATURE_COLUMNS, LABEL_COLUMN);
        let is_out_of_range = matches!(result, Err(TrainerError::ColumnOutOfRange { .. }));
        prop_assert!(is_out_of_range);
    }
}

proptest! {
    #[test]
    fn split_is_deterministic(table in arbitrary_table(15, 16)) {
        let a = table.split(FEATURE_COLUMNS, LABEL_COLUMN).unwrap();
        let b = table.split(FEATURE_COLUMNS, LABEL_COLUMN).unwrap();
        prop_assert_eq!(a, b);
    }
}
