//! Subcommand execution

use chrono::{Local, NaiveDate};
use repdb::{Connector, DbPool, Pool, Value};
use repdb_reports::{incomings, Week};
use serde_json::json;
use tracing::info;

use crate::cli::Commands;
use crate::error::Result;

/// Command line parameter to call parameter: `null` is NULL, integers are
/// integers, anything else is passed as text for the server to coerce.
pub fn parse_param(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        Value::Null
    } else if let Ok(n) = raw.parse::<i64>() {
        Value::Int(n)
    } else {
        Value::Text(raw.to_string())
    }
}

fn parse_params(raw: &[String]) -> Vec<Value> {
    raw.iter().map(|p| parse_param(p)).collect()
}

/// Run `command` against `pool` and return its JSON output.
pub async fn run<C: Connector>(pool: &DbPool<C>, command: &Commands) -> Result<serde_json::Value> {
    match command {
        Commands::Ping => {
            pool.connect().await?;
            info!(endpoint = %pool.config().endpoint(), "database reachable");
            Ok(json!({
                "endpoint": pool.config().endpoint(),
                "status": pool.status().to_string(),
                "available": pool.available_connections(),
                "max": pool.max_connections(),
            }))
        }
        Commands::Call {
            procedure,
            rows,
            params,
        } => {
            let result = pool
                .callproc(procedure, *rows, parse_params(params))
                .await?;
            Ok(serde_json::to_value(result)?)
        }
        Commands::Exec {
            statement,
            rows,
            params,
        } => {
            let result = pool
                .execute(statement, *rows, parse_params(params))
                .await?;
            Ok(serde_json::to_value(result)?)
        }
        Commands::Incomings { week_of } => {
            let week = select_week(*week_of, Local::now().date_naive());
            let days = incomings::week(pool, &week).await?;
            Ok(json!({ "week": week, "days": days }))
        }
    }
}

/// The week containing `week_of`, or the last full week before `today`.
pub fn select_week(week_of: Option<NaiveDate>, today: NaiveDate) -> Week {
    match week_of {
        Some(day) => Week::containing(day),
        None => Week::previous(today),
    }
}
