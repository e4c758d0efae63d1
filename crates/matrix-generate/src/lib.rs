//! Cartesian case generation for table-driven tests.
//!
//! Given a template record and one dimension of candidate values per field,
//! the engine lazily yields one fresh record per combination, first field
//! varying fastest.
//!
//! ```
//! use matrix_generate::{PanicReporter, dims, generate};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Meal {
//!     who: String,
//!     food: String,
//! }
//!
//! let meals: Vec<Meal> = generate(
//!     &PanicReporter,
//!     &Meal::default(),
//!     &dims![["Priyanka", "Pedro"], ["Pizza", "Sushi"]],
//! )
//! .collect();
//! assert_eq!(meals.len(), 4);
//! assert_eq!(meals[1].who, "Pedro");
//! assert_eq!(meals[1].food, "Pizza");
//! ```

pub mod dimensions;
pub mod engine;
pub mod model;
pub mod odometer;
mod record;
pub mod reporter;
pub mod rows;

pub use dimensions::{DimensionSource, Dimensions, Unencodable};
pub use engine::{Cases, IndexedMatrix, Matrix, MatrixEngine, generate, try_generate};
pub use matrix_core::{ErrorCategory, MatrixError, RecordShape};
pub use model::{Case, GenerateOptions};
pub use reporter::{PanicReporter, TestReporter};
pub use rows::{Row, Rows};

#[doc(hidden)]
pub use serde_json;

/// Build a dimension list from JSON-like literals or serializable values.
///
/// Each argument becomes one dimension: `dims![["a", "b"], [1, -1], (ids)]`.
/// Elements of a bracketed dimension are `null`, nested brackets, JSON
/// objects, or any serializable expression. Values JSON cannot carry, such
/// as `f64::NAN` or `Some(None)`, are reported by the engine instead of
/// turning into `null`.
#[macro_export]
macro_rules! dims {
    ($($dimension:tt),* $(,)?) => {
        $crate::Dimensions::new(vec![$($crate::__dimension!($dimension)),*])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __dimension {
    (@seq [$($done:expr,)*] []) => {
        $crate::dimensions::sequence(vec![$($done,)*])
    };
    (@seq [$($done:expr,)*] [$($current:tt)+]) => {
        $crate::__dimension!(@seq [$($done,)* $crate::__dimension!(@value $($current)+),] [])
    };
    (@seq [$($done:expr,)*] [$($current:tt)+] , $($rest:tt)*) => {
        $crate::__dimension!(@seq [$($done,)* $crate::__dimension!(@value $($current)+),] [] $($rest)*)
    };
    (@seq [$($done:expr,)*] [$($current:tt)*] $next:tt $($rest:tt)*) => {
        $crate::__dimension!(@seq [$($done,)*] [$($current)* $next] $($rest)*)
    };
    (@value null) => {
        ::core::result::Result::Ok($crate::serde_json::Value::Null)
    };
    (@value [$($element:tt)*]) => {
        $crate::__dimension!([$($element)*])
    };
    (@value {$($entry:tt)*}) => {
        ::core::result::Result::Ok($crate::serde_json::json!({$($entry)*}))
    };
    (@value $($value:tt)+) => {
        $crate::dimensions::encode(&($($value)+))
    };
    // Single-token elements skip the comma scan.
    ([$($element:tt),* $(,)?]) => {
        $crate::dimensions::sequence(vec![$($crate::__dimension!(@value $element)),*])
    };
    ([$($element:tt)*]) => {
        $crate::__dimension!(@seq [] [] $($element)*)
    };
    ($($value:tt)+) => {
        $crate::__dimension!(@value $($value)+)
    };
}
