//! Command line definition

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use repdb::Cardinality;

use crate::settings::Source;

#[derive(Debug, Parser)]
#[command(name = "repdb")]
#[command(about = "Call report stored procedures through the repdb pool")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database to connect to
    #[arg(short, long, value_enum, default_value_t = Source::Wisepark)]
    pub source: Source,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Connect, report pool status, disconnect
    Ping,
    /// Call a stored procedure
    Call {
        /// Procedure name, optionally schema-qualified
        procedure: String,
        /// Rows to return: one, all, none, or a number
        #[arg(short, long, default_value = "all")]
        rows: Cardinality,
        /// Positional parameters; `null` passes NULL
        params: Vec<String>,
    },
    /// Run a parameterized statement
    Exec {
        /// Statement text with `?` placeholders
        statement: String,
        /// Rows to return: one, all, none, or a number
        #[arg(short, long, default_value = "all")]
        rows: Cardinality,
        /// Positional parameters; `null` passes NULL
        params: Vec<String>,
    },
    /// Daily incomings of a week (default: last full week)
    Incomings {
        /// Any date within the wanted week (YYYY-MM-DD)
        #[arg(long)]
        week_of: Option<NaiveDate>,
    },
}
