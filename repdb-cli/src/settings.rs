//! Deployment configuration

use std::path::Path;

use clap::ValueEnum;
use config::{Config, Environment, File};
use repdb::ConnectionConfig;
use serde::Deserialize;

use crate::error::{CliError, Result};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG: &str = "repdb";

/// Prefix of environment overrides, e.g. `REPDB__WISEPARK__RDBS__PASSWORD`
pub const ENV_PREFIX: &str = "REPDB";

/// Which configured database to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Parking system database
    Wisepark,
    /// Integration database
    Integration,
}

impl Source {
    pub fn name(self) -> &'static str {
        match self {
            Source::Wisepark => "wisepark",
            Source::Integration => "integration",
        }
    }
}

/// One `[<source>.rdbs]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    pub rdbs: ConnectionConfig,
}

/// Top-level deployment settings
///
/// ```toml
/// log_level = "info"
///
/// [wisepark.rdbs]
/// host = "db1"
/// login = "r"
/// password = "x"
/// database = "reports"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub wisepark: Option<DatabaseSection>,

    #[serde(default)]
    pub integration: Option<DatabaseSection>,
}

impl Settings {
    /// Load settings using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name(DEFAULT_CONFIG).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Validate every configured database
    pub fn validate(&self) -> Result<()> {
        if self.wisepark.is_none() && self.integration.is_none() {
            return Err(CliError::ValidationError(
                "at least one of [wisepark.rdbs] or [integration.rdbs] is required".into(),
            ));
        }
        for (name, section) in [
            ("wisepark", &self.wisepark),
            ("integration", &self.integration),
        ] {
            if let Some(section) = section {
                section
                    .rdbs
                    .validate()
                    .map_err(|e| CliError::ValidationError(format!("{}: {}", name, e)))?;
            }
        }
        Ok(())
    }

    /// Connection settings of `source`
    pub fn database(&self, source: Source) -> Result<&ConnectionConfig> {
        let section = match source {
            Source::Wisepark => &self.wisepark,
            Source::Integration => &self.integration,
        };
        section
            .as_ref()
            .map(|s| &s.rdbs)
            .ok_or(CliError::MissingSource(source.name()))
    }
}
