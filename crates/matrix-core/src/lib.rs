//! Core contracts for matrix case generation.
//!
//! This crate defines the record descriptors, the error taxonomy, serde-based
//! template introspection, and the structural validation shared by the
//! generator and the CLI.

pub mod error;
pub mod introspect;
pub mod types;
pub mod validation;

pub use error::{ErrorCategory, MatrixError, Result};
pub use introspect::{inspect_template, inspect_type};
pub use types::{Dimension, FieldDescriptor, RecordShape, TypeShape, ValueKind};
pub use validation::{validate, validate_dimensions};
