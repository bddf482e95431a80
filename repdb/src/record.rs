//! Materialized result rows and shaped result sets

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::call::Cardinality;
use crate::error::{Error, Result};
use crate::traits::{FromRow, Row};
use crate::value::Value;

/// One result row: column name to value, in the server's column order.
///
/// Records own their data, so they outlive the connection that produced
/// them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a column, replacing an existing one with the same name.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode into a typed record.
    pub fn decode<T: FromRow>(&self) -> Result<T> {
        T::from_row(self)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl Row for Record {
    fn get_value(&self, column: &str) -> Result<Value> {
        self.get(column)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Outcome of a call with [`Cardinality::None`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExecuteResult {
    /// Number of rows affected by the call
    pub rows_affected: u64,
    /// Last insert ID (for INSERT statements)
    pub last_insert_id: Option<u64>,
}

/// Rows fetched by a backend before shaping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched {
    pub rows: Vec<Record>,
    pub summary: ExecuteResult,
}

/// A result shaped by the call's [`Cardinality`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ResultSet {
    /// `One`: the single row.
    Row(Record),
    /// `One`: the call returned no rows. Not an error.
    NoRows,
    /// `Many` / `All`: rows in server order.
    Rows(Vec<Record>),
    /// `None`: completion confirmation.
    Done(ExecuteResult),
}

impl ResultSet {
    /// Shape fetched rows according to `cardinality`.
    ///
    /// Extra rows beyond the hint are dropped, so a backend that
    /// over-fetches still yields the documented shape.
    pub fn shape(cardinality: Cardinality, fetched: Fetched) -> Self {
        let Fetched { mut rows, summary } = fetched;
        match cardinality {
            Cardinality::One => match rows.into_iter().next() {
                Some(row) => ResultSet::Row(row),
                None => ResultSet::NoRows,
            },
            Cardinality::Many(n) => {
                rows.truncate(n);
                ResultSet::Rows(rows)
            }
            Cardinality::All => ResultSet::Rows(rows),
            Cardinality::None => ResultSet::Done(summary),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ResultSet::Row(_) => "row",
            ResultSet::NoRows => "no rows",
            ResultSet::Rows(_) => "rows",
            ResultSet::Done(_) => "done",
        }
    }

    /// Number of rows carried.
    pub fn len(&self) -> usize {
        match self {
            ResultSet::Row(_) => 1,
            ResultSet::Rows(rows) => rows.len(),
            ResultSet::NoRows | ResultSet::Done(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The row of a `One` call, `None` for the no-rows sentinel.
    pub fn into_one(self) -> Result<Option<Record>> {
        match self {
            ResultSet::Row(row) => Ok(Some(row)),
            ResultSet::NoRows => Ok(None),
            other => Err(Error::Shape {
                expected: "row",
                actual: other.kind(),
            }),
        }
    }

    /// The rows of a `Many` or `All` call.
    pub fn into_rows(self) -> Result<Vec<Record>> {
        match self {
            ResultSet::Rows(rows) => Ok(rows),
            other => Err(Error::Shape {
                expected: "rows",
                actual: other.kind(),
            }),
        }
    }

    /// The confirmation of a `None` call.
    pub fn into_done(self) -> Result<ExecuteResult> {
        match self {
            ResultSet::Done(summary) => Ok(summary),
            other => Err(Error::Shape {
                expected: "done",
                actual: other.kind(),
            }),
        }
    }

    /// Decode the row of a `One` call.
    pub fn decode_one<T: FromRow>(self) -> Result<Option<T>> {
        self.into_one()?.map(|row| T::from_row(&row)).transpose()
    }

    /// Decode the rows of a `Many` or `All` call.
    pub fn decode_rows<T: FromRow>(self) -> Result<Vec<T>> {
        self.into_rows()?.iter().map(T::from_row).collect()
    }
}
