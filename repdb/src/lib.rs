//! repdb - report database access
//!
//! A bounded, self-healing pool for calling MySQL stored procedures from
//! unattended report producers, notifiers and web handlers.
//!
//! # Features
//!
//! - **One call contract**: `callproc`/`execute` with a declared
//!   [`Cardinality`] always return the matching [`ResultSet`] shape
//! - **Bounded concurrency**: at most `pool_max` calls in flight; slots are
//!   released on every exit path, including cancellation
//! - **Self-healing**: transient connection loss triggers exactly one
//!   reconnect, and the failed call is reported as retryable
//! - **Typed records**: `#[derive(FromRow)]` decodes rows at the boundary
//!
//! # Example
//!
//! ```ignore
//! use repdb::{Call, ConnectionConfig, FromRow, MySqlPool};
//!
//! #[derive(FromRow)]
//! pub struct Incomings {
//!     #[repdb(rename = "totalEntries")]
//!     pub total_entries: i64,
//!     #[repdb(rename = "totalExits")]
//!     pub total_exits: i64,
//! }
//!
//! async fn monday(pool: &MySqlPool) -> repdb::Result<Option<Incomings>> {
//!     Call::procedure("rep_incomings")
//!         .bind("2024-01-08")
//!         .fetch_one(pool)
//!         .await
//! }
//! ```

// Lets the derive's `repdb::` paths resolve inside this crate's own tests
extern crate self as repdb;

pub mod call;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod mysql;
pub mod pool;
pub mod query;
pub mod record;
pub mod traits;
pub mod value;

// Re-export the derive macro
pub use repdb_derive::FromRow;

// Re-export main types
pub use call::{CallRequest, Cardinality, Target};
pub use config::ConnectionConfig;
pub use error::{Error, Result};
pub use mysql::{MySqlBackend, MySqlConnector, MySqlPool};
pub use pool::{DbPool, PoolStatus};
pub use query::Call;
pub use record::{ExecuteResult, Fetched, Record, ResultSet};
pub use traits::{Backend, Connector, FromRow, FromValue, Pool, Row, RowExt, ToValue};
pub use value::Value;
