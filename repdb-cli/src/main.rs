//! CLI entry point for repdb

use anyhow::{anyhow, Result};
use clap::Parser;
use repdb::MySqlPool;
use tracing::{info, warn};

use repdb_cli::{commands, logging, Cli, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use log_level)
    let settings = Settings::load(cli.config.as_deref())?;
    logging::init(settings.log_level.as_deref(), cli.json);
    settings.validate()?;

    let config = settings.database(cli.source)?.clone();
    info!(source = cli.source.name(), endpoint = %config.endpoint(), "starting");
    let pool = MySqlPool::mysql(config)?;

    // Ctrl-C drops the running command, which also aborts a connect that
    // is still retrying
    let outcome = tokio::select! {
        outcome = commands::run(&pool, &cli.command) => outcome.map_err(anyhow::Error::from),
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted");
            Err(anyhow!("interrupted"))
        }
    };

    pool.disconnect().await?;
    let output = outcome?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
