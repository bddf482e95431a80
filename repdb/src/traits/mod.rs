//! Core traits for repdb

mod connector;
mod from_row;
mod from_value;
mod pool;
mod to_value;

pub use connector::{Backend, Connector};
pub use from_row::{FromRow, Row, RowExt};
pub use from_value::FromValue;
pub use pool::Pool;
pub use to_value::ToValue;
