use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serde data-model kind of a type or of a dimension value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    Number,
    Char,
    String,
    Bytes,
    Null,
    Unit,
    Option,
    Seq,
    Tuple,
    Map,
    Struct,
    NewtypeStruct,
    TupleStruct,
    Enum,
    Identifier,
    Any,
}

impl ValueKind {
    /// Kind of an already serialized JSON value.
    pub fn of_json(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Seq,
            Value::Object(_) => ValueKind::Map,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Float => "float",
            ValueKind::Number => "number",
            ValueKind::Char => "char",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Null => "null",
            ValueKind::Unit => "unit",
            ValueKind::Option => "option",
            ValueKind::Seq => "seq",
            ValueKind::Tuple => "tuple",
            ValueKind::Map => "map",
            ValueKind::Struct => "struct",
            ValueKind::NewtypeStruct => "newtype struct",
            ValueKind::TupleStruct => "tuple struct",
            ValueKind::Enum => "enum",
            ValueKind::Identifier => "identifier",
            ValueKind::Any => "self-describing value",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a record template, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub index: usize,
    pub name: String,
    /// Whether the engine can assign this field when building a record.
    pub exported: bool,
}

/// Ordered field layout of a record template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordShape {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordShape {
    /// Build a shape whose fields are all exported.
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, name)| FieldDescriptor {
                index,
                name: name.into(),
                exported: true,
            })
            .collect();
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

/// Result of inspecting a type through serde.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Record(RecordShape),
    Other(ValueKind),
}

/// Candidate values for one record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub index: usize,
    pub field: String,
    pub values: Vec<Value>,
}

impl Dimension {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
