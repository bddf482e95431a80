//! Income and consumables summaries

use chrono::NaiveDate;
use futures::future::try_join_all;
use repdb::{Call, Pool};
use tracing::debug;

use crate::error::Result;
use crate::models::Incomings;
use crate::period::Week;

/// Income summary for one day; `None` when the procedure returns no row.
pub async fn day<P: Pool>(pool: &P, day: NaiveDate) -> Result<Option<Incomings>> {
    Ok(Call::procedure("rep_incomings")
        .bind(day)
        .fetch_one(pool)
        .await?)
}

/// Income summaries for Monday through Sunday, fetched concurrently.
///
/// Fails as a whole if any day fails, so a report is never built from a
/// partial week.
pub async fn week<P: Pool>(pool: &P, week: &Week) -> Result<Vec<Option<Incomings>>> {
    let days = try_join_all(week.days().map(|d| day(pool, d))).await?;
    debug!(
        week = week.number,
        monday = %week.monday,
        found = days.iter().filter(|d| d.is_some()).count(),
        "gathered weekly incomings"
    );
    Ok(days)
}

/// Consumables summary for one day.
pub async fn consumables<P: Pool>(pool: &P, day: NaiveDate) -> Result<Option<Incomings>> {
    Ok(Call::procedure("rep_consumables")
        .bind(day)
        .fetch_one(pool)
        .await?)
}
