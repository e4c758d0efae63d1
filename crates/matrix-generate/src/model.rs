use serde::{Deserialize, Serialize};

/// Options for the matrix engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Trial-assign every dimension value to its field before the first case.
    ///
    /// Off by default: the trial builds records before anything is pulled.
    pub check_value_types: bool,
    /// Abort when the number of combinations exceeds this limit.
    pub max_combinations: Option<usize>,
}

/// One generated case together with the combination that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Case<T> {
    /// Zero-based position of the case in enumeration order.
    pub ordinal: usize,
    /// Index into each dimension, one per field.
    pub positions: Vec<usize>,
    /// Field values joined with `_`, e.g. `Priyanka_Pizza`.
    pub name: String,
    pub record: T,
}
