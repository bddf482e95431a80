//! Error types for report data access

use thiserror::Error;

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Pool, call or decode failure
    #[error(transparent)]
    Db(#[from] repdb::Error),

    /// Date input not in `dd.mm.yyyy` form
    #[error("Invalid date {0:?}: expected dd.mm.yyyy")]
    InvalidDate(String),

    /// Report period ends before it starts
    #[error("Invalid period: {from} is after {to}")]
    InvalidPeriod {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },
}

impl Error {
    /// Whether reissuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Db(e) if e.is_retryable())
    }
}
