//! Dimension values and their conversion into JSON.
//!
//! Records are built from `serde_json::Value`s. Some Rust values have no
//! faithful JSON form: non-finite floats and `Some(None)` both serialize to
//! `null`, and 128-bit integers may not fit a JSON number. [`encode`] rejects
//! those values instead of letting them collapse, and [`Dimensions`] carries
//! the first rejection to the engine, which reports it after the structural
//! checks.

use std::fmt::Display;

use matrix_core::MatrixError;
use serde::Serialize;
use serde::ser;
use serde_json::Value;
use thiserror::Error;

/// A value that cannot be carried as JSON without changing meaning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Unencodable {
    /// Position within the dimension, when the value sits in a sequence.
    pub position: Option<usize>,
    pub message: String,
}

impl Unencodable {
    fn new(message: impl Into<String>) -> Self {
        Self {
            position: None,
            message: message.into(),
        }
    }

    fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl ser::Error for Unencodable {
    fn custom<T: Display>(msg: T) -> Self {
        Unencodable::new(msg.to_string())
    }
}

/// Convert one value to JSON, refusing lossy conversions.
pub fn encode<V: Serialize + ?Sized>(value: &V) -> Result<Value, Unencodable> {
    value.serialize(Audit::root())?;
    serde_json::to_value(value).map_err(|err| Unencodable::new(err.to_string()))
}

/// Assemble a sequence from separately encoded elements.
pub fn sequence(elements: Vec<Result<Value, Unencodable>>) -> Result<Value, Unencodable> {
    elements
        .into_iter()
        .enumerate()
        .map(|(position, element)| element.map_err(|err| err.at(position)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Dimension list built by [`dims!`](crate::dims).
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    values: Vec<Value>,
    rejected: Option<MatrixError>,
}

impl Dimensions {
    pub fn new(encoded: Vec<Result<Value, Unencodable>>) -> Self {
        let mut rejected = None;
        let values = encoded
            .into_iter()
            .enumerate()
            .map(|(index, dimension)| match dimension {
                Ok(value) => value,
                Err(err) => {
                    // Keep the dimension's shape so structural checks still apply.
                    let placeholder = match err.position {
                        Some(_) => Value::Array(Vec::new()),
                        None => Value::Null,
                    };
                    rejected.get_or_insert(MatrixError::Unrepresentable {
                        index,
                        position: err.position.unwrap_or(0),
                        message: err.message,
                    });
                    placeholder
                }
            })
            .collect();
        Self { values, rejected }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for Dimensions {
    fn from(values: Vec<Value>) -> Self {
        Self {
            values,
            rejected: None,
        }
    }
}

/// Anything the engine accepts as a list of dimensions.
pub trait DimensionSource {
    fn dimension_values(&self) -> &[Value];

    /// First value that could not be converted, if any.
    fn rejected_value(&self) -> Option<&MatrixError> {
        None
    }
}

impl DimensionSource for Dimensions {
    fn dimension_values(&self) -> &[Value] {
        &self.values
    }

    fn rejected_value(&self) -> Option<&MatrixError> {
        self.rejected.as_ref()
    }
}

impl DimensionSource for [Value] {
    fn dimension_values(&self) -> &[Value] {
        self
    }
}

impl<const N: usize> DimensionSource for [Value; N] {
    fn dimension_values(&self) -> &[Value] {
        self
    }
}

impl DimensionSource for Vec<Value> {
    fn dimension_values(&self) -> &[Value] {
        self
    }
}

/// Walks a value and fails on the first part JSON would alter.
#[derive(Clone, Copy)]
struct Audit {
    /// Sequence positions are reported only at the top level.
    root: bool,
    /// Inside `Some`, where a `null` would read back as `None`.
    in_some: bool,
}

impl Audit {
    fn root() -> Self {
        Self {
            root: true,
            in_some: false,
        }
    }

    fn nested() -> Self {
        Self {
            root: false,
            in_some: false,
        }
    }

    fn null_inside_some(self, what: &str) -> Result<(), Unencodable> {
        if self.in_some {
            return Err(Unencodable::new(format!(
                "Some({what}) serializes as null and reads back as None"
            )));
        }
        Ok(())
    }

    fn compound(self) -> AuditCompound {
        AuditCompound {
            track: self.root,
            next: 0,
        }
    }
}

fn finite(value: f64) -> Result<(), Unencodable> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Unencodable::new(format!("non-finite float {value} serializes as null")))
    }
}

impl ser::Serializer for Audit {
    type Ok = ();
    type Error = Unencodable;
    type SerializeSeq = AuditCompound;
    type SerializeTuple = AuditCompound;
    type SerializeTupleStruct = AuditCompound;
    type SerializeTupleVariant = AuditCompound;
    type SerializeMap = AuditCompound;
    type SerializeStruct = AuditCompound;
    type SerializeStructVariant = AuditCompound;

    fn serialize_bool(self, _v: bool) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_i128(self, v: i128) -> Result<(), Unencodable> {
        if i64::try_from(v).is_err() && u64::try_from(v).is_err() {
            return Err(Unencodable::new(format!("integer {v} does not fit in 64 bits")));
        }
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_u128(self, v: u128) -> Result<(), Unencodable> {
        if u64::try_from(v).is_err() {
            return Err(Unencodable::new(format!("integer {v} does not fit in 64 bits")));
        }
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), Unencodable> {
        finite(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), Unencodable> {
        finite(v)
    }

    fn serialize_char(self, _v: char) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), Unencodable> {
        self.null_inside_some("None")
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Unencodable> {
        value.serialize(Audit {
            root: self.root,
            in_some: true,
        })
    }

    fn serialize_unit(self) -> Result<(), Unencodable> {
        self.null_inside_some("()")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<(), Unencodable> {
        self.null_inside_some(name)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), Unencodable> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Unencodable> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), Unencodable> {
        value.serialize(Audit::nested())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<AuditCompound, Unencodable> {
        Ok(self.compound())
    }

    fn serialize_tuple(self, _len: usize) -> Result<AuditCompound, Unencodable> {
        Ok(self.compound())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<AuditCompound, Unencodable> {
        Ok(self.compound())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<AuditCompound, Unencodable> {
        Ok(Audit::nested().compound())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<AuditCompound, Unencodable> {
        Ok(Audit::nested().compound())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<AuditCompound, Unencodable> {
        Ok(Audit::nested().compound())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<AuditCompound, Unencodable> {
        Ok(Audit::nested().compound())
    }
}

struct AuditCompound {
    track: bool,
    next: usize,
}

impl AuditCompound {
    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        let position = self.next;
        let track = self.track;
        self.next += 1;
        value
            .serialize(Audit::nested())
            .map_err(|err| if track { err.at(position) } else { err })
    }
}

impl ser::SerializeSeq for AuditCompound {
    type Ok = ();
    type Error = Unencodable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        self.element(value)
    }

    fn end(self) -> Result<(), Unencodable> {
        Ok(())
    }
}

impl ser::SerializeTuple for AuditCompound {
    type Ok = ();
    type Error = Unencodable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        self.element(value)
    }

    fn end(self) -> Result<(), Unencodable> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for AuditCompound {
    type Ok = ();
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        self.element(value)
    }

    fn end(self) -> Result<(), Unencodable> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for AuditCompound {
    type Ok = ();
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        self.element(value)
    }

    fn end(self) -> Result<(), Unencodable> {
        Ok(())
    }
}

impl ser::SerializeMap for AuditCompound {
    type Ok = ();
    type Error = Unencodable;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Unencodable> {
        key.serialize(Audit::nested())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unencodable> {
        self.element(value)
    }

    fn end(self) -> Result<(), Unencodable> {
        Ok(())
    }
}

impl ser::SerializeStruct for AuditCompound {
    type Ok = ();
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Unencodable> {
        self.element(value)
    }

    fn end(self) -> Result<(), Unencodable> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for AuditCompound {
    type Ok = ();
    type Error = Unencodable;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Unencodable> {
        self.element(value)
    }

    fn end(self) -> Result<(), Unencodable> {
        Ok(())
    }
}
