//! Error types for repdb

use thiserror::Error;

/// Result type alias for repdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during pool and procedure operations
#[derive(Error, Debug)]
pub enum Error {
    /// The connection is unusable but the server is expected back.
    ///
    /// Raised by `connect()` attempts internally (and retried there), and
    /// returned from a call that was in flight when the connection died.
    /// `reconnected` tells the caller whether the pool is ready again.
    #[error("Transient connection error{}: {message}", code_suffix(*.code))]
    Transient {
        code: Option<u16>,
        message: String,
        reconnected: bool,
    },

    /// Authentication, unknown database, or another error retrying cannot fix
    #[error("Fatal connection error: {0}")]
    FatalConnection(String),

    /// Server-reported error for a call (bad parameters, missing procedure, ...)
    #[error("Query error {code} ({state}): {message}")]
    Query {
        code: u16,
        state: String,
        message: String,
    },

    /// Client-side driver failure that is not a server error
    #[error("Driver error: {0}")]
    Driver(String),

    /// The pool has been disconnected
    #[error("Pool is closed")]
    Closed,

    /// Invalid connection settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Procedure name is not a plain (optionally schema-qualified) identifier
    #[error("Invalid procedure name: {0:?}")]
    InvalidProcedure(String),

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Null value for non-optional field
    #[error("Unexpected null value for column: {0}")]
    UnexpectedNull(String),

    /// Row decode error
    #[error("Failed to decode row: {0}")]
    RowDecode(String),

    /// The result set does not have the shape the caller asked to decode
    #[error("Result shape mismatch: expected {expected}, got {actual}")]
    Shape {
        expected: &'static str,
        actual: &'static str,
    },
}

fn code_suffix(code: Option<u16>) -> String {
    code.map(|c| format!(" {}", c)).unwrap_or_default()
}

impl Error {
    /// Build a transient error that has not been recovered yet.
    pub fn transient(code: Option<u16>, message: impl Into<String>) -> Self {
        Error::Transient {
            code,
            message: message.into(),
            reconnected: false,
        }
    }

    /// Whether this error is of the connection-lost class.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }

    /// Whether reissuing the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transient {
                reconnected: true,
                ..
            }
        )
    }

    pub(crate) fn with_reconnected(self, done: bool) -> Self {
        match self {
            Error::Transient { code, message, .. } => Error::Transient {
                code,
                message,
                reconnected: done,
            },
            other => other,
        }
    }
}
