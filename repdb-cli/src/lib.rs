//! Operator CLI for the report database pool
//!
//! The `repdb` binary connects to one of the configured databases, runs a
//! procedure, statement or canned report, prints the result as JSON and
//! disconnects.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod settings;

pub use cli::{Cli, Commands};
pub use error::{CliError, Result};
pub use settings::{Settings, Source};
