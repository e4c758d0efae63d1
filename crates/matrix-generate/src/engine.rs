use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use matrix_core::{
    Dimension, MatrixError, RecordShape, TypeShape, inspect_template, validate,
    validate_dimensions,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::dimensions::DimensionSource;
use crate::model::{Case, GenerateOptions};
use crate::record::{check_value_types, materialize};
use crate::reporter::TestReporter;
use crate::rows::{Row, Rows};

/// Entry point for enumerating case matrices.
#[derive(Debug, Clone, Default)]
pub struct MatrixEngine {
    options: GenerateOptions,
}

impl MatrixEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Validate `template` against `dimensions` and return the lazy case
    /// sequence, or the first violated precondition.
    pub fn try_generate<T, D>(&self, template: &T, dimensions: &D) -> Result<Cases<T>, MatrixError>
    where
        T: Serialize + DeserializeOwned,
        D: DimensionSource + ?Sized,
    {
        let shape = inspect_template(template)?;
        let validated = validate(&shape, dimensions.dimension_values())?;
        let rows = self.bounded_rows(validated, dimensions)?;

        if self.options.check_value_types {
            check_value_types::<T>(rows.dimensions())?;
        }

        if let TypeShape::Record(record) = &shape {
            debug!(
                record = %record.name,
                fields = record.len(),
                total = rows.total(),
                "matrix ready"
            );
        }

        Ok(Cases::new(rows))
    }

    /// Like [`MatrixEngine::try_generate`], but a violated precondition aborts
    /// the current test through `reporter`.
    #[track_caller]
    pub fn generate<'r, T, R, D>(
        &self,
        reporter: &'r R,
        template: &T,
        dimensions: &D,
    ) -> Matrix<'r, T, R>
    where
        T: Serialize + DeserializeOwned,
        R: TestReporter + ?Sized,
        D: DimensionSource + ?Sized,
    {
        reporter.helper();

        match self.try_generate(template, dimensions) {
            Ok(cases) => Matrix { cases, reporter },
            Err(err) => {
                warn!(error = %err, category = ?err.category(), "matrix validation failed");
                reporter.fatal(format_args!("{err}"))
            }
        }
    }

    /// Enumerate combinations for a record layout known only at runtime.
    pub fn rows<D>(&self, shape: &RecordShape, dimensions: &D) -> Result<Rows, MatrixError>
    where
        D: DimensionSource + ?Sized,
    {
        let validated = validate_dimensions(shape, dimensions.dimension_values())?;
        let rows = self.bounded_rows(validated, dimensions)?;
        debug!(
            record = %shape.name,
            fields = shape.len(),
            total = rows.total(),
            "matrix ready"
        );
        Ok(rows)
    }

    /// Runs after structural validation: rejected values, then the limit.
    fn bounded_rows<D>(&self, validated: Vec<Dimension>, source: &D) -> Result<Rows, MatrixError>
    where
        D: DimensionSource + ?Sized,
    {
        if let Some(rejected) = source.rejected_value() {
            return Err(rejected.clone());
        }
        let rows = Rows::new(validated)?;
        match self.options.max_combinations {
            Some(limit) if rows.total() > limit => {
                Err(MatrixError::TooManyCombinations { limit })
            }
            _ => Ok(rows),
        }
    }
}

/// Validate with default options and return the lazy case sequence.
pub fn try_generate<T, D>(template: &T, dimensions: &D) -> Result<Cases<T>, MatrixError>
where
    T: Serialize + DeserializeOwned,
    D: DimensionSource + ?Sized,
{
    MatrixEngine::default().try_generate(template, dimensions)
}

/// Generate every combination of `dimensions` as a `T`, aborting the test
/// through `reporter` on malformed input.
///
/// `dimensions[i]` must be a sequence of values for the i-th field of `T`.
/// The first field varies fastest.
#[track_caller]
pub fn generate<'r, T, R, D>(reporter: &'r R, template: &T, dimensions: &D) -> Matrix<'r, T, R>
where
    T: Serialize + DeserializeOwned,
    R: TestReporter + ?Sized,
    D: DimensionSource + ?Sized,
{
    MatrixEngine::default().generate(reporter, template, dimensions)
}

/// Lazy sequence of records; construction failures are returned as values.
pub struct Cases<T> {
    rows: Rows,
    record: PhantomData<fn() -> T>,
}

impl<T> Cases<T> {
    fn new(rows: Rows) -> Self {
        Self {
            rows,
            record: PhantomData,
        }
    }

    /// Number of combinations in the full matrix.
    pub fn total(&self) -> usize {
        self.rows.total()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        self.rows.dimensions()
    }
}

impl<T: DeserializeOwned> Cases<T> {
    /// Pull the next record along with its position vector and name.
    pub fn next_case(&mut self) -> Option<Result<Case<T>, MatrixError>> {
        let row = self.rows.next()?;
        Some(into_case(row))
    }

    pub fn indexed(mut self) -> impl Iterator<Item = Result<Case<T>, MatrixError>> {
        std::iter::from_fn(move || self.next_case())
    }
}

fn into_case<T: DeserializeOwned>(row: Row) -> Result<Case<T>, MatrixError> {
    let name = row.name();
    let Row {
        ordinal,
        positions,
        values,
    } = row;
    let record = materialize(ordinal, values)?;
    Ok(Case {
        ordinal,
        positions,
        name,
        record,
    })
}

impl<T: DeserializeOwned> Iterator for Cases<T> {
    type Item = Result<T, MatrixError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(materialize(row.ordinal, row.values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let row = self.rows.nth(n)?;
        Some(materialize(row.ordinal, row.values))
    }
}

impl<T: DeserializeOwned> ExactSizeIterator for Cases<T> {}

impl<T: DeserializeOwned> FusedIterator for Cases<T> {}

impl<T> fmt::Debug for Cases<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cases")
            .field("total", &self.rows.total())
            .field("remaining", &self.rows.remaining())
            .finish()
    }
}

/// Lazy sequence of records bound to a host test.
///
/// A record that cannot be built aborts the test through the reporter.
pub struct Matrix<'r, T, R: ?Sized> {
    cases: Cases<T>,
    reporter: &'r R,
}

impl<T, R: ?Sized> Matrix<'_, T, R> {
    pub fn total(&self) -> usize {
        self.cases.total()
    }
}

impl<'r, T, R> Matrix<'r, T, R>
where
    T: DeserializeOwned,
    R: TestReporter + ?Sized,
{
    /// Yield each record with its position vector and name.
    pub fn indexed(self) -> IndexedMatrix<'r, T, R> {
        IndexedMatrix { matrix: self }
    }

    #[track_caller]
    fn abort(&self, err: &MatrixError) -> ! {
        self.reporter.helper();
        warn!(error = %err, "case construction failed");
        self.reporter.fatal(format_args!("{err}"))
    }
}

impl<T, R> Iterator for Matrix<'_, T, R>
where
    T: DeserializeOwned,
    R: TestReporter + ?Sized,
{
    type Item = T;

    #[track_caller]
    fn next(&mut self) -> Option<T> {
        match self.cases.next()? {
            Ok(record) => Some(record),
            Err(err) => self.abort(&err),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cases.size_hint()
    }

    #[track_caller]
    fn nth(&mut self, n: usize) -> Option<T> {
        match self.cases.nth(n)? {
            Ok(record) => Some(record),
            Err(err) => self.abort(&err),
        }
    }
}

impl<T, R> ExactSizeIterator for Matrix<'_, T, R>
where
    T: DeserializeOwned,
    R: TestReporter + ?Sized,
{
}

impl<T, R> FusedIterator for Matrix<'_, T, R>
where
    T: DeserializeOwned,
    R: TestReporter + ?Sized,
{
}

impl<T, R: ?Sized> fmt::Debug for Matrix<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("cases", &self.cases)
            .finish_non_exhaustive()
    }
}

/// [`Matrix`] yielding [`Case`]s; returned by [`Matrix::indexed`].
pub struct IndexedMatrix<'r, T, R: ?Sized> {
    matrix: Matrix<'r, T, R>,
}

impl<T, R: ?Sized> IndexedMatrix<'_, T, R> {
    pub fn total(&self) -> usize {
        self.matrix.total()
    }
}

impl<T, R> Iterator for IndexedMatrix<'_, T, R>
where
    T: DeserializeOwned,
    R: TestReporter + ?Sized,
{
    type Item = Case<T>;

    #[track_caller]
    fn next(&mut self) -> Option<Case<T>> {
        match self.matrix.cases.next_case()? {
            Ok(case) => Some(case),
            Err(err) => self.matrix.abort(&err),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.matrix.size_hint()
    }
}

impl<T, R> ExactSizeIterator for IndexedMatrix<'_, T, R>
where
    T: DeserializeOwned,
    R: TestReporter + ?Sized,
{
}

impl<T, R> FusedIterator for IndexedMatrix<'_, T, R>
where
    T: DeserializeOwned,
    R: TestReporter + ?Sized,
{
}

impl<T, R: ?Sized> fmt::Debug for IndexedMatrix<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedMatrix")
            .field("cases", &self.matrix.cases)
            .finish_non_exhaustive()
    }
}
