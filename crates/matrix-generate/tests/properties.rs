use matrix_generate::{MatrixEngine, RecordShape, Row};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Dimension `i` holds the strings `"d{i}v{j}"` so every value is unique.
fn matrix_inputs(lengths: &[usize]) -> (RecordShape, Vec<Value>) {
    let shape = RecordShape::new("Synthetic", (0..lengths.len()).map(|i| format!("f{i}")));
    let dimensions = lengths
        .iter()
        .enumerate()
        .map(|(i, len)| Value::Array((0..*len).map(|j| json!(format!("d{i}v{j}"))).collect()))
        .collect();
    (shape, dimensions)
}

fn enumerate(lengths: &[usize]) -> Vec<Row> {
    let (shape, dimensions) = matrix_inputs(lengths);
    MatrixEngine::default()
        .rows(&shape, &dimensions)
        .expect("valid synthetic matrix")
        .collect()
}

proptest! {
    #[test]
    fn count_is_product_of_lengths(lengths in prop::collection::vec(0_usize..5, 1..5)) {
        let rows = enumerate(&lengths);
        let expected: usize = lengths.iter().product();
        prop_assert_eq!(rows.len(), expected);
    }

    #[test]
    fn fields_hold_values_at_their_positions(lengths in prop::collection::vec(1_usize..4, 1..5)) {
        for row in enumerate(&lengths) {
            prop_assert_eq!(row.values.len(), lengths.len());
            for (i, (field, value)) in row.values.iter().enumerate() {
                prop_assert_eq!(field, &format!("f{i}"));
                prop_assert_eq!(value, &json!(format!("d{i}v{}", row.positions[i])));
            }
        }
    }

    #[test]
    fn ordinals_decode_as_mixed_radix(lengths in prop::collection::vec(1_usize..4, 1..5)) {
        for row in enumerate(&lengths) {
            let mut rest = row.ordinal;
            for (position, len) in row.positions.iter().zip(&lengths) {
                prop_assert_eq!(*position, rest % len);
                rest /= len;
            }
            prop_assert_eq!(rest, 0);
        }
    }

    #[test]
    fn consecutive_rows_follow_ripple_carry(lengths in prop::collection::vec(1_usize..4, 1..5)) {
        let rows = enumerate(&lengths);
        for pair in rows.windows(2) {
            let (prev, next) = (&pair[0].positions, &pair[1].positions);
            let carry_to = prev
                .iter()
                .zip(&lengths)
                .position(|(position, len)| position + 1 < *len)
                .expect("a non-final row has a digit to increment");
            for i in 0..lengths.len() {
                let expected = match i.cmp(&carry_to) {
                    std::cmp::Ordering::Less => 0,
                    std::cmp::Ordering::Equal => prev[i] + 1,
                    std::cmp::Ordering::Greater => prev[i],
                };
                prop_assert_eq!(next[i], expected);
            }
        }
    }

    #[test]
    fn enumeration_is_repeatable(lengths in prop::collection::vec(0_usize..4, 1..4)) {
        prop_assert_eq!(enumerate(&lengths), enumerate(&lengths));
    }

    #[test]
    fn nth_agrees_with_sequential_walk(
        lengths in prop::collection::vec(1_usize..4, 1..4),
        skip in 0_usize..40,
    ) {
        let all = enumerate(&lengths);
        let (shape, dimensions) = matrix_inputs(&lengths);
        let mut rows = MatrixEngine::default()
            .rows(&shape, &dimensions)
            .expect("valid synthetic matrix");
        prop_assert_eq!(rows.nth(skip), all.get(skip).cloned());
    }
}
