//! Process registry heartbeats in the integration database

use chrono::NaiveDateTime;
use repdb::{Call, Pool};

use crate::error::Result;

const RUNNING: i64 = 1;
const STOPPED: i64 = 0;

/// Record that process `name` started with `pid`.
pub async fn register<P: Pool>(pool: &P, name: &str, pid: u32, at: NaiveDateTime) -> Result<()> {
    Call::procedure("is_processes_ins")
        .bind(name)
        .bind(RUNNING)
        .bind(pid)
        .bind(at)
        .run(pool)
        .await?;
    Ok(())
}

/// Refresh the liveness timestamp of a running process.
pub async fn heartbeat<P: Pool>(pool: &P, name: &str, at: NaiveDateTime) -> Result<()> {
    update(pool, name, RUNNING, at).await
}

/// Mark the process stopped, on orderly shutdown.
pub async fn stopped<P: Pool>(pool: &P, name: &str, at: NaiveDateTime) -> Result<()> {
    update(pool, name, STOPPED, at).await
}

async fn update<P: Pool>(pool: &P, name: &str, status: i64, at: NaiveDateTime) -> Result<()> {
    Call::procedure("is_processes_upd")
        .bind(name)
        .bind(status)
        .bind(0_i64)
        .bind(at)
        .run(pool)
        .await?;
    Ok(())
}
