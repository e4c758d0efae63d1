use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::{MatrixError, Result};
use crate::types::{Dimension, RecordShape, TypeShape, ValueKind};

/// Validate an inspected template and its dimensions.
///
/// This checks, in order:
/// - the template is a struct with at least one field
/// - field names are non-empty and unique
/// - at least one dimension was supplied, one per field
/// - every field can be assigned by the engine
/// - every dimension is a sequence of values
pub fn validate(shape: &TypeShape, dimensions: &[Value]) -> Result<Vec<Dimension>> {
    let record = match shape {
        TypeShape::Record(record) => record,
        TypeShape::Other(kind) => return Err(MatrixError::NotARecord { kind: *kind }),
    };
    validate_dimensions(record, dimensions)
}

/// Validate dimensions against a known record layout.
///
/// Works on synthetic shapes, so callers without a Rust record type can
/// still enumerate combinations.
pub fn validate_dimensions(shape: &RecordShape, dimensions: &[Value]) -> Result<Vec<Dimension>> {
    if shape.is_empty() {
        return Err(MatrixError::NoFields);
    }

    // Rows are keyed by field name.
    let mut seen = BTreeSet::new();
    for field in &shape.fields {
        if field.name.is_empty() {
            return Err(MatrixError::UnnamedField { index: field.index });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(MatrixError::DuplicateField {
                index: field.index,
                name: field.name.clone(),
            });
        }
    }

    if dimensions.is_empty() {
        return Err(MatrixError::NoDimensions);
    }

    if dimensions.len() != shape.len() {
        return Err(MatrixError::DimensionCount {
            fields: shape.len(),
            dimensions: dimensions.len(),
        });
    }

    if let Some(field) = shape.fields.iter().find(|field| !field.exported) {
        return Err(MatrixError::PrivateField {
            index: field.index,
            name: field.name.clone(),
        });
    }

    shape
        .fields
        .iter()
        .zip(dimensions)
        .enumerate()
        .map(|(index, (field, dimension))| match dimension {
            Value::Array(values) => Ok(Dimension {
                index,
                field: field.name.clone(),
                values: values.clone(),
            }),
            other => Err(MatrixError::NotASequence {
                index,
                kind: ValueKind::of_json(other),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorCategory;
    use crate::types::FieldDescriptor;

    fn meal() -> RecordShape {
        RecordShape::new("Meal", ["who", "food"])
    }

    #[test]
    fn accepts_one_sequence_per_field() {
        let dims = validate_dimensions(
            &meal(),
            &[json!(["Priyanka", "Pedro"]), json!(["Pizza"])],
        )
        .expect("valid dimensions");

        assert_eq!(dims.len(), 2);
        assert_eq!(dims[0].field, "who");
        assert_eq!(dims[0].values, vec![json!("Priyanka"), json!("Pedro")]);
        assert_eq!(dims[1].index, 1);
        assert_eq!(dims[1].field, "food");
    }

    #[test]
    fn empty_dimension_is_not_an_error() {
        let dims = validate_dimensions(&meal(), &[json!([]), json!(["Pizza"])])
            .expect("empty dimension is allowed");
        assert!(dims[0].is_empty());
    }

    #[test]
    fn rejects_non_record_template() {
        let err = validate(&TypeShape::Other(ValueKind::Map), &[json!([1])])
            .expect_err("map template must fail");
        assert_eq!(err, MatrixError::NotARecord { kind: ValueKind::Map });
        assert_eq!(err.to_string(), "template must be a struct, got map");
    }

    #[test]
    fn rejects_record_without_fields() {
        let shape = RecordShape::new("Empty", Vec::<String>::new());
        let err = validate_dimensions(&shape, &[json!([1])]).expect_err("no fields");
        assert_eq!(err, MatrixError::NoFields);
        assert_eq!(err.category(), ErrorCategory::Shape);
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let shape = RecordShape::new("Synthetic", ["a", "a"]);
        let err = validate_dimensions(&shape, &[json!([1, 2]), json!([3])])
            .expect_err("duplicate field");
        assert_eq!(
            err,
            MatrixError::DuplicateField {
                index: 1,
                name: "a".to_string()
            }
        );
        assert_eq!(err.category(), ErrorCategory::Shape);
        assert_eq!(
            err.to_string(),
            "template field a appears more than once (field 1)"
        );
    }

    #[test]
    fn rejects_empty_field_name() {
        let shape = RecordShape::new("Synthetic", ["who", ""]);
        let err = validate_dimensions(&shape, &[json!(["Pedro"]), json!([1])])
            .expect_err("empty field name");
        assert_eq!(err, MatrixError::UnnamedField { index: 1 });
    }

    #[test]
    fn field_names_are_checked_before_dimensions() {
        let shape = RecordShape::new("Synthetic", ["a", "a"]);
        let err = validate_dimensions(&shape, &[]).expect_err("duplicate field");
        assert_eq!(err.category(), ErrorCategory::Shape);
    }

    #[test]
    fn rejects_missing_dimensions() {
        let err = validate_dimensions(&meal(), &[]).expect_err("no dimensions");
        assert_eq!(err, MatrixError::NoDimensions);
        assert_eq!(err.category(), ErrorCategory::DimensionCount);
    }

    #[test]
    fn rejects_dimension_count_mismatch() {
        let err = validate_dimensions(&meal(), &[json!(["Priyanka"])]).expect_err("count");
        assert_eq!(
            err,
            MatrixError::DimensionCount {
                fields: 2,
                dimensions: 1
            }
        );
    }

    #[test]
    fn count_check_runs_before_visibility_check() {
        let mut shape = meal();
        shape.fields[1].exported = false;
        let err = validate_dimensions(&shape, &[json!([1])]).expect_err("count first");
        assert_eq!(err.category(), ErrorCategory::DimensionCount);
    }

    #[test]
    fn rejects_private_field_by_name() {
        let shape = RecordShape {
            name: "Audited".to_string(),
            fields: vec![
                FieldDescriptor {
                    index: 0,
                    name: "who".to_string(),
                    exported: true,
                },
                FieldDescriptor {
                    index: 1,
                    name: "checksum".to_string(),
                    exported: false,
                },
            ],
        };
        let err = validate_dimensions(&shape, &[json!(["Pedro"]), json!([1])])
            .expect_err("private field");
        assert_eq!(
            err,
            MatrixError::PrivateField {
                index: 1,
                name: "checksum".to_string()
            }
        );
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn rejects_scalar_dimension_with_its_kind() {
        let err = validate_dimensions(&meal(), &[json!(["Pedro"]), json!("Pizza")])
            .expect_err("scalar dimension");
        assert_eq!(
            err,
            MatrixError::NotASequence {
                index: 1,
                kind: ValueKind::String
            }
        );
        assert_eq!(err.category(), ErrorCategory::DimensionShape);
    }

    #[test]
    fn rejects_map_dimension() {
        let err = validate_dimensions(&meal(), &[json!({"who": "Pedro"}), json!(["Pizza"])])
            .expect_err("map dimension");
        assert!(err.to_string().contains("got: map"));
    }
}
