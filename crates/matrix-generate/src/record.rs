//! Record construction from a combination row.
//!
//! A row is fed to the record's `Deserialize` impl one field at a time so a
//! rejected value can be attributed to the field it was meant for. Indirect
//! fields (`Option<Box<U>>`, `Box<U>`) deserialize a fresh allocation for
//! every record, so generated records never share storage.

use std::cell::RefCell;

use matrix_core::{Dimension, MatrixError};
use serde::de::value::StringDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, Visitor};
use serde_json::{Map, Value};

/// A row that the record type refused.
#[derive(Debug)]
pub(crate) struct Rejection {
    /// Field whose value failed, when the failure happened on a field.
    pub field: Option<String>,
    pub error: serde_json::Error,
}

impl Rejection {
    fn describe(&self) -> String {
        match &self.field {
            Some(field) => format!("field {field}: {}", self.error),
            None => self.error.to_string(),
        }
    }
}

/// Build one record from its field values.
pub(crate) fn assign<T: DeserializeOwned>(values: Map<String, Value>) -> Result<T, Rejection> {
    let failed_field = RefCell::new(None);
    let result = T::deserialize(RowDeserializer {
        values,
        failed_field: &failed_field,
    });
    result.map_err(|error| Rejection {
        field: failed_field.into_inner(),
        error,
    })
}

/// Build the record for case `ordinal`.
pub(crate) fn materialize<T: DeserializeOwned>(
    ordinal: usize,
    values: Map<String, Value>,
) -> Result<T, MatrixError> {
    assign(values).map_err(|rejection| MatrixError::Construction {
        ordinal,
        message: rejection.describe(),
    })
}

/// Trial-assign every dimension value to its field.
///
/// Fields other than the one under test take the first value of their
/// dimension, so the cost is the sum of the dimension lengths.
pub(crate) fn check_value_types<T: DeserializeOwned>(
    dimensions: &[Dimension],
) -> Result<(), MatrixError> {
    if dimensions.is_empty() || dimensions.iter().any(Dimension::is_empty) {
        return Ok(());
    }

    let baseline: Map<String, Value> = dimensions
        .iter()
        .map(|dimension| (dimension.field.clone(), dimension.values[0].clone()))
        .collect();

    if let Err(rejection) = assign::<T>(baseline.clone()) {
        let dimension = rejection
            .field
            .as_deref()
            .and_then(|field| dimensions.iter().find(|dimension| dimension.field == field))
            .unwrap_or(&dimensions[0]);
        return Err(incompatible(dimension, 0, &rejection));
    }

    for dimension in dimensions {
        for (position, value) in dimension.values.iter().enumerate().skip(1) {
            let mut row = baseline.clone();
            row.insert(dimension.field.clone(), value.clone());
            if let Err(rejection) = assign::<T>(row) {
                return Err(incompatible(dimension, position, &rejection));
            }
        }
    }

    Ok(())
}

fn incompatible(dimension: &Dimension, position: usize, rejection: &Rejection) -> MatrixError {
    MatrixError::IncompatibleValue {
        index: dimension.index,
        position,
        field: dimension.field.clone(),
        message: rejection.error.to_string(),
    }
}

struct RowDeserializer<'a> {
    values: Map<String, Value>,
    failed_field: &'a RefCell<Option<String>>,
}

impl<'de> de::Deserializer<'de> for RowDeserializer<'_> {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(RowAccess {
            entries: self.values.into_iter(),
            pending: None,
            failed_field: self.failed_field,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct RowAccess<'a> {
    entries: serde_json::map::IntoIter,
    pending: Option<(String, Value)>,
    failed_field: &'a RefCell<Option<String>>,
}

impl<'de> MapAccess<'de> for RowAccess<'_> {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        let Some((field, value)) = self.entries.next() else {
            return Ok(None);
        };
        let key: StringDeserializer<serde_json::Error> = field.clone().into_deserializer();
        let key = seed.deserialize(key)?;
        self.pending = Some((field, value));
        Ok(Some(key))
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        let (field, value) = self
            .pending
            .take()
            .ok_or_else(|| <serde_json::Error as de::Error>::custom("value requested before key"))?;
        seed.deserialize(value).map_err(|err| {
            *self.failed_field.borrow_mut() = Some(field);
            err
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Meal {
        who: String,
        portions: u8,
        side: Option<Box<String>>,
    }

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

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

    #[test]
    fn assigns_direct_and_indirect_fields() {
        let meal: Meal = assign(row(json!({"who": "Paul", "portions": 2, "side": "fries"})))
            .expect("assign meal");
        assert_eq!(
            meal,
            Meal {
                who: "Paul".to_string(),
                portions: 2,
                side: Some(Box::new("fries".to_string())),
            }
        );
    }

    #[test]
    fn null_leaves_optional_field_empty() {
        let meal: Meal = assign(row(json!({"who": "Paul", "portions": 1, "side": null})))
            .expect("assign meal");
        assert!(meal.side.is_none());
    }

    #[test]
    fn rejected_value_names_its_field() {
        let rejection = assign::<Meal>(row(json!({"who": "Paul", "portions": "two", "side": null})))
            .expect_err("portions must be a number");
        assert_eq!(rejection.field.as_deref(), Some("portions"));
    }

    #[test]
    fn materialize_reports_construction_error() {
        let err = materialize::<Meal>(7, row(json!({"who": 1, "portions": 1, "side": null})))
            .expect_err("who must be a string");
        let MatrixError::Construction { ordinal, message } = err else {
            panic!("expected construction error");
        };
        assert_eq!(ordinal, 7);
        assert!(message.starts_with("field who:"), "message: {message}");
    }

    #[test]
    fn value_check_points_at_offending_value() {
        let dims = vec![
            dimension(0, "who", json!(["Paul", "Pedro"])),
            dimension(1, "portions", json!([1, 2, 300])),
            dimension(2, "side", json!([null, "salad"])),
        ];
        let err = check_value_types::<Meal>(&dims).expect_err("300 does not fit u8");
        let MatrixError::IncompatibleValue {
            index,
            position,
            field,
            ..
        } = err
        else {
            panic!("expected incompatible value");
        };
        assert_eq!((index, position, field.as_str()), (1, 2, "portions"));
    }

    #[test]
    fn value_check_blames_bad_first_value() {
        let dims = vec![
            dimension(0, "who", json!(["Paul"])),
            dimension(1, "portions", json!([1])),
            dimension(2, "side", json!([42])),
        ];
        let err = check_value_types::<Meal>(&dims).expect_err("side must be a string");
        assert!(matches!(
            err,
            MatrixError::IncompatibleValue {
                index: 2,
                position: 0,
                ..
            }
        ));
    }

    #[test]
    fn value_check_skips_empty_matrix() {
        let dims = vec![
            dimension(0, "who", json!([])),
            dimension(1, "portions", json!(["not a number"])),
            dimension(2, "side", json!([null])),
        ];
        assert!(check_value_types::<Meal>(&dims).is_ok());
    }
}
