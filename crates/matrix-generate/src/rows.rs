use std::iter::FusedIterator;

use matrix_core::{Dimension, MatrixError};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::odometer::{Odometer, total_combinations};

/// One combination of dimension values, keyed by field name in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub ordinal: usize,
    pub positions: Vec<usize>,
    pub values: Map<String, Value>,
}

impl Row {
    /// Label built from the field values, e.g. `Priyanka_Pizza`.
    pub fn name(&self) -> String {
        case_name(self.values.values())
    }
}

pub(crate) fn case_name<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Lazy, single-pass enumeration of every combination of the dimensions.
///
/// Rows are built only when pulled; nothing beyond the current position
/// vector is kept between pulls.
#[derive(Debug, Clone)]
pub struct Rows {
    dimensions: Vec<Dimension>,
    odometer: Odometer,
    emitted: usize,
    total: usize,
}

impl Rows {
    /// Fails with [`MatrixError::TooManyCombinations`] when the product of
    /// the dimension lengths does not fit in `usize`.
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self, MatrixError> {
        let radices: Vec<usize> = dimensions.iter().map(Dimension::len).collect();
        let total = total_combinations(&radices)
            .ok_or(MatrixError::TooManyCombinations { limit: usize::MAX })?;

        Ok(Self {
            dimensions,
            odometer: Odometer::new(radices),
            emitted: 0,
            total,
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.emitted
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    fn current(&self) -> Row {
        let positions = self.odometer.positions().to_vec();
        let values = self
            .dimensions
            .iter()
            .zip(&positions)
            .map(|(dimension, position)| {
                (dimension.field.clone(), dimension.values[*position].clone())
            })
            .collect();

        Row {
            ordinal: self.emitted,
            positions,
            values,
        }
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.emitted >= self.total {
            return None;
        }

        let row = self.current();
        self.emitted += 1;
        self.odometer.advance();
        trace!(ordinal = row.ordinal, positions = ?row.positions, "combination produced");

        if self.emitted == self.total {
            debug!(total = self.total, "combinations exhausted");
        }

        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Row> {
        let target = self.emitted.saturating_add(n);
        if target >= self.total {
            self.emitted = self.total;
            return None;
        }
        self.odometer.seek(target);
        self.emitted = target;
        self.next()
    }
}

impl ExactSizeIterator for Rows {}

impl FusedIterator for Rows {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dimension(index: usize, field: &str, values: Value) -> Dimension {
        let Value::Array(values) = values else {
            panic!("dimension values must be an array");
        };
        Dimension {
            index,
            field: field.to_string(),
            values,
        }
    }

    fn meals() -> Rows {
        Rows::new(vec![
            dimension(0, "who", json!(["A", "B"])),
            dimension(1, "food", json!(["X", "Y", "Z"])),
        ])
        .expect("rows")
    }

    #[test]
    fn yields_first_dimension_fastest() {
        let names: Vec<String> = meals().map(|row| row.name()).collect();
        assert_eq!(names, vec!["A_X", "B_X", "A_Y", "B_Y", "A_Z", "B_Z"]);
    }

    #[test]
    fn rows_keep_field_order() {
        let row = meals().next().expect("first row");
        let fields: Vec<&str> = row.values.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["who", "food"]);
        assert_eq!(row.positions, vec![0, 0]);
        assert_eq!(row.ordinal, 0);
    }

    #[test]
    fn empty_dimension_yields_nothing() {
        let mut rows = Rows::new(vec![
            dimension(0, "who", json!(["A", "B"])),
            dimension(1, "food", json!([])),
        ])
        .expect("rows");
        assert_eq!(rows.total(), 0);
        assert_eq!(rows.len(), 0);
        assert!(rows.next().is_none());
    }

    #[test]
    fn size_hint_counts_down() {
        let mut rows = meals();
        assert_eq!(rows.len(), 6);
        rows.next();
        rows.next();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn nth_skips_without_losing_order() {
        let mut rows = meals();
        let row = rows.nth(3).expect("fourth row");
        assert_eq!(row.name(), "B_Y");
        assert_eq!(row.ordinal, 3);
        assert_eq!(rows.next().map(|row| row.name()), Some("A_Z".to_string()));
        assert!(rows.nth(5).is_none());
        assert!(rows.next().is_none());
    }

    #[test]
    fn non_string_values_are_named_as_json() {
        let mut rows = Rows::new(vec![
            dimension(0, "count", json!([1])),
            dimension(1, "flag", json!([true])),
            dimension(2, "note", json!([null])),
        ])
        .expect("rows");
        assert_eq!(rows.next().map(|row| row.name()), Some("1_true_null".to_string()));
    }
}
