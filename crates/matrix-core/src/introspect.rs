//! Record introspection through the serde data model.
//!
//! A probing deserializer observes which `deserialize_*` entry point a type's
//! `Deserialize` impl calls. Structs reveal their ordered field names; every
//! other entry point reveals the kind of the type. Serializing the template
//! then shows the fields the type writes but does not accept back, which the
//! engine treats as private.

use std::fmt;

use serde::Serialize;
use serde::de::{self, DeserializeOwned, Visitor};
use serde_json::Value;

use crate::error::{MatrixError, Result};
use crate::types::{FieldDescriptor, RecordShape, TypeShape, ValueKind};

/// Inspect the shape of `T` as declared by its `Deserialize` impl.
///
/// Every declared field is reported as exported.
pub fn inspect_type<T: DeserializeOwned>() -> Result<TypeShape> {
    Ok(match probe::<T>()? {
        Observed::Struct { name, fields } => {
            TypeShape::Record(RecordShape::new(name, fields.iter().copied()))
        }
        Observed::Kind(kind) => TypeShape::Other(kind),
    })
}

/// Inspect a template value, marking fields it serializes but cannot
/// deserialize as private.
pub fn inspect_template<T>(template: &T) -> Result<TypeShape>
where
    T: Serialize + DeserializeOwned,
{
    let (name, declared) = match probe::<T>()? {
        Observed::Struct { name, fields } => (name, fields),
        Observed::Kind(kind) => return Ok(TypeShape::Other(kind)),
    };

    let serialized = serde_json::to_value(template)
        .map_err(|err| MatrixError::Template(err.to_string()))?;
    let written: Vec<&str> = match &serialized {
        Value::Object(map) => map.keys().map(String::as_str).collect(),
        _ => Vec::new(),
    };

    Ok(TypeShape::Record(RecordShape {
        name: name.to_string(),
        fields: merge_fields(declared, &written),
    }))
}

/// Interleave declared fields with written-only fields, keeping the
/// serialization order of the template.
fn merge_fields(declared: &[&str], written: &[&str]) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(declared.len());
    let mut push = |name: &str, exported: bool| {
        let index = fields.len();
        fields.push(FieldDescriptor {
            index,
            name: name.to_string(),
            exported,
        });
    };

    let mut next_declared = 0;
    for key in written {
        match declared.iter().position(|name| name == key) {
            Some(at) => {
                while next_declared <= at {
                    push(declared[next_declared], true);
                    next_declared += 1;
                }
            }
            None => push(*key, false),
        }
    }
    for name in &declared[next_declared..] {
        push(*name, true);
    }

    fields
}

enum Observed {
    Struct {
        name: &'static str,
        fields: &'static [&'static str],
    },
    Kind(ValueKind),
}

fn probe<T: DeserializeOwned>() -> Result<Observed> {
    match T::deserialize(ShapeProbe) {
        Err(ProbeStop::Struct { name, fields }) => Ok(Observed::Struct { name, fields }),
        Err(ProbeStop::Kind(kind)) => Ok(Observed::Kind(kind)),
        Err(ProbeStop::Custom(message)) => Err(MatrixError::Template(message)),
        Ok(_) => Err(MatrixError::Template(
            "type deserialized without reading any input".to_string(),
        )),
    }
}

#[derive(Debug)]
enum ProbeStop {
    Struct {
        name: &'static str,
        fields: &'static [&'static str],
    },
    Kind(ValueKind),
    Custom(String),
}

impl fmt::Display for ProbeStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStop::Struct { name, .. } => write!(f, "observed struct {name}"),
            ProbeStop::Kind(kind) => write!(f, "observed {kind}"),
            ProbeStop::Custom(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ProbeStop {}

impl de::Error for ProbeStop {
    fn custom<M: fmt::Display>(msg: M) -> Self {
        ProbeStop::Custom(msg.to_string())
    }
}

struct ShapeProbe;

macro_rules! observe {
    ($($method:ident => $kind:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> std::result::Result<V::Value, ProbeStop> {
                Err(ProbeStop::Kind(ValueKind::$kind))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ShapeProbe {
    type Error = ProbeStop;

    observe! {
        deserialize_any => Any,
        deserialize_bool => Bool,
        deserialize_i8 => Int,
        deserialize_i16 => Int,
        deserialize_i32 => Int,
        deserialize_i64 => Int,
        deserialize_i128 => Int,
        deserialize_u8 => Uint,
        deserialize_u16 => Uint,
        deserialize_u32 => Uint,
        deserialize_u64 => Uint,
        deserialize_u128 => Uint,
        deserialize_f32 => Float,
        deserialize_f64 => Float,
        deserialize_char => Char,
        deserialize_str => String,
        deserialize_string => String,
        deserialize_bytes => Bytes,
        deserialize_byte_buf => Bytes,
        deserialize_option => Option,
        deserialize_unit => Unit,
        deserialize_seq => Seq,
        deserialize_map => Map,
        deserialize_identifier => Identifier,
        deserialize_ignored_any => Any,
    }

    // A unit struct is a record without fields.
    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> std::result::Result<V::Value, ProbeStop> {
        Err(ProbeStop::Struct { name, fields: &[] })
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> std::result::Result<V::Value, ProbeStop> {
        Err(ProbeStop::Kind(ValueKind::NewtypeStruct))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> std::result::Result<V::Value, ProbeStop> {
        Err(ProbeStop::Kind(ValueKind::Tuple))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> std::result::Result<V::Value, ProbeStop> {
        Err(ProbeStop::Kind(ValueKind::TupleStruct))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> std::result::Result<V::Value, ProbeStop> {
        Err(ProbeStop::Struct { name, fields })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> std::result::Result<V::Value, ProbeStop> {
        Err(ProbeStop::Kind(ValueKind::Enum))
    }
}
