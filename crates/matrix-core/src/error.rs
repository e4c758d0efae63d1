use thiserror::Error;

use crate::types::ValueKind;

/// Broad class of a [`MatrixError`].
///
/// Tests and hosts match on the category rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The template is not a usable record.
    Shape,
    /// Dimensions are missing or do not line up with the record fields.
    DimensionCount,
    /// A record field cannot be assigned by the engine.
    FieldVisibility,
    /// A dimension is not an ordered sequence.
    DimensionShape,
    /// A dimension value does not fit its field.
    DimensionType,
    /// The combination count exceeds the configured or representable limit.
    Limit,
    /// A record could not be built from a combination.
    Construction,
}

/// Errors raised while validating or materializing a case matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("template must be a struct, got {kind}")]
    NotARecord { kind: ValueKind },
    #[error("template must have at least one field")]
    NoFields,
    #[error("template cannot be inspected: {0}")]
    Template(String),
    #[error("template field {index} has an empty name")]
    UnnamedField { index: usize },
    #[error("template field {name} appears more than once (field {index})")]
    DuplicateField { index: usize, name: String },
    #[error("must supply one dimension per template field")]
    NoDimensions,
    #[error("template has {fields} fields but {dimensions} dimensions were supplied")]
    DimensionCount { fields: usize, dimensions: usize },
    #[error("template must not have private fields, got: {name} (field {index})")]
    PrivateField { index: usize, name: String },
    #[error("dimensions must be sequences of field values, got: {kind} (dimension {index})")]
    NotASequence { index: usize, kind: ValueKind },
    #[error("dimension {index} value {position} does not fit field {field}: {message}")]
    IncompatibleValue {
        index: usize,
        position: usize,
        field: String,
        message: String,
    },
    #[error("dimension {index} value {position} has no JSON form: {message}")]
    Unrepresentable {
        index: usize,
        position: usize,
        message: String,
    },
    #[error("combination count exceeds {limit}")]
    TooManyCombinations { limit: usize },
    #[error("cannot build case {ordinal}: {message}")]
    Construction { ordinal: usize, message: String },
}

impl MatrixError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MatrixError::NotARecord { .. }
            | MatrixError::NoFields
            | MatrixError::Template(_)
            | MatrixError::UnnamedField { .. }
            | MatrixError::DuplicateField { .. } => ErrorCategory::Shape,
            MatrixError::NoDimensions | MatrixError::DimensionCount { .. } => {
                ErrorCategory::DimensionCount
            }
            MatrixError::PrivateField { .. } => ErrorCategory::FieldVisibility,
            MatrixError::NotASequence { .. } => ErrorCategory::DimensionShape,
            MatrixError::IncompatibleValue { .. } | MatrixError::Unrepresentable { .. } => {
                ErrorCategory::DimensionType
            }
            MatrixError::TooManyCombinations { .. } => ErrorCategory::Limit,
            MatrixError::Construction { .. } => ErrorCategory::Construction,
        }
    }
}

/// Convenience alias for results returned by matrix crates.
pub type Result<T> = std::result::Result<T, MatrixError>;
