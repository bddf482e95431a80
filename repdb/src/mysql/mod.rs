//! MySQL driver for repdb, built on `mysql_async`

mod errors;
mod pool;
mod row;
mod types;

pub use pool::{MySqlBackend, MySqlConnector, MySqlPool};
