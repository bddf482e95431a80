//! Typed access to the report stored procedures
//!
//! Each module wraps the procedures one report family uses. Functions take
//! any [`repdb::Pool`], so producers share one pool per database and tests
//! can run them against the `mock` connector.
//!
//! ```ignore
//! use repdb_reports::{incomings, period::Week};
//!
//! let week = Week::previous(chrono::Local::now().date_naive());
//! let days = incomings::week(&pool, &week).await?;
//! ```

pub mod ampp;
pub mod error;
pub mod incomings;
pub mod models;
pub mod period;
pub mod plates;
pub mod processes;

pub use error::{Error, Result};
pub use models::{ConsolidatedReport, DetailedEntry, Device, Incomings, PlateReport, PlateStats};
pub use period::{Period, Week};
