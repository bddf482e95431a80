//! Call requests: what to run, with which parameters, and how many rows back

use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Caller-declared shape of a call's result.
///
/// The pool honors the hint exactly; see [`ResultSet`](crate::ResultSet)
/// for the value each variant produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Zero or one row.
    One,
    /// Up to `n` rows.
    Many(usize),
    /// Every row.
    All,
    /// No result expected (inserts, updates, heartbeats).
    None,
}

impl Cardinality {
    /// Maximum number of rows the backend has to materialize.
    pub fn limit(self) -> Option<usize> {
        match self {
            Cardinality::One => Some(1),
            Cardinality::Many(n) => Some(n),
            Cardinality::All => None,
            Cardinality::None => Some(0),
        }
    }
}

/// Legacy integer row hints: `-1` all rows, `0` nothing, `1` one row,
/// `n` up to n rows.
impl TryFrom<i64> for Cardinality {
    type Error = Error;

    fn try_from(rows: i64) -> Result<Self> {
        match rows {
            -1 => Ok(Cardinality::All),
            0 => Ok(Cardinality::None),
            1 => Ok(Cardinality::One),
            n if n > 1 => usize::try_from(n)
                .map(Cardinality::Many)
                .map_err(|_| Error::Config(format!("row hint {} too large", n))),
            n => Err(Error::Config(format!("unsupported row hint {}", n))),
        }
    }
}

impl std::str::FromStr for Cardinality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "one" => Ok(Cardinality::One),
            "all" => Ok(Cardinality::All),
            "none" => Ok(Cardinality::None),
            other => other
                .parse::<i64>()
                .map_err(|_| Error::Config(format!("unknown row hint {:?}", s)))
                .and_then(Cardinality::try_from),
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => f.write_str("one"),
            Cardinality::Many(n) => write!(f, "many({})", n),
            Cardinality::All => f.write_str("all"),
            Cardinality::None => f.write_str("none"),
        }
    }
}

/// What a call runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A stored procedure invoked by name.
    Procedure(String),
    /// Raw parameterized statement text with `?` placeholders.
    Statement(String),
}

impl Target {
    /// Procedure name or statement text.
    pub fn text(&self) -> &str {
        match self {
            Target::Procedure(name) | Target::Statement(name) => name,
        }
    }

    /// SQL text sent to the server for `params` positional parameters.
    pub fn sql(&self, params: usize) -> String {
        match self {
            Target::Procedure(name) => {
                let quoted = name
                    .split('.')
                    .map(|part| format!("`{}`", part))
                    .collect::<Vec<_>>()
                    .join(".");
                let placeholders = vec!["?"; params].join(", ");
                format!("CALL {}({})", quoted, placeholders)
            }
            Target::Statement(text) => text.clone(),
        }
    }
}

/// Procedure names are spliced into `CALL`, so only `[A-Za-z0-9_$]`
/// identifiers, optionally `schema.`-qualified, are accepted.
pub fn validate_procedure(name: &str) -> Result<()> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part.len() <= 64
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    };
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| valid_part(p)) {
        Ok(())
    } else {
        Err(Error::InvalidProcedure(name.to_string()))
    }
}

/// A single procedure or statement call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub target: Target,
    pub params: Vec<Value>,
    pub cardinality: Cardinality,
}

impl CallRequest {
    /// Request a stored procedure call. Fails on an invalid name.
    pub fn procedure(
        name: impl Into<String>,
        cardinality: Cardinality,
        params: Vec<Value>,
    ) -> Result<Self> {
        let name = name.into();
        validate_procedure(&name)?;
        Ok(Self {
            target: Target::Procedure(name),
            params,
            cardinality,
        })
    }

    /// Request a raw statement.
    pub fn statement(text: impl Into<String>, cardinality: Cardinality, params: Vec<Value>) -> Self {
        Self {
            target: Target::Statement(text.into()),
            params,
            cardinality,
        }
    }

    /// SQL text to send for this request.
    pub fn sql(&self) -> String {
        self.target.sql(self.params.len())
    }
}
