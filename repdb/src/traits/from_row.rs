//! FromRow trait for mapping database rows to Rust structs

use crate::error::{Error, Result};
use crate::value::Value;

/// A database row that can be queried by column name.
///
/// Implemented by [`Record`](crate::Record); typed result records decode
/// through it.
pub trait Row {
    /// Get a value from the row by column name as a dynamic Value.
    ///
    /// Returns an error if the column doesn't exist.
    fn get_value(&self, column: &str) -> Result<Value>;
}

/// Extension trait for typed access to row values.
pub trait RowExt: Row {
    /// Get a typed value from the row by column name.
    fn get<T: crate::FromValue>(&self, column: &str) -> Result<T> {
        let value = self.get_value(column)?;
        if value.is_null() {
            return T::from_value(value).map_err(|_| Error::UnexpectedNull(column.to_string()));
        }
        T::from_value(value)
    }
}

// Implement RowExt for all Row types
impl<R: Row> RowExt for R {}

/// Trait for types that can be constructed from a database row.
///
/// One type per stored procedure result: decoding fails fast with a
/// column or conversion error when the procedure's shape drifts.
/// Usually implemented via `#[derive(FromRow)]`.
///
/// # Manual Implementation
///
/// ```ignore
/// use repdb::{FromRow, Row, RowExt, Result};
///
/// pub struct LastReport {
///     pub rep_date: Option<chrono::NaiveDate>,
/// }
///
/// impl FromRow for LastReport {
///     fn from_row<R: Row>(row: &R) -> Result<Self> {
///         Ok(Self {
///             rep_date: row.get("repDate")?,
///         })
///     }
///
///     fn column_names() -> &'static [&'static str] {
///         &["repDate"]
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Construct an instance of this type from a database row.
    fn from_row<R: Row>(row: &R) -> Result<Self>;

    /// Get the column names that this type reads from.
    ///
    /// Used in decode error messages and by callers checking a procedure's
    /// declared columns.
    fn column_names() -> &'static [&'static str];
}
