//! Plate recognition report: gather per-device daily counters from the
//! parking database and store them in the integration database

use chrono::NaiveDate;
use futures::future::{try_join, try_join_all};
use repdb::{Call, ExecuteResult, Pool};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Device, LastReport, PlateReport, PlateStats};
use crate::period::plates_backfill;

/// Every lane device.
pub async fn devices<P: Pool>(pool: &P) -> Result<Vec<Device>> {
    Ok(Call::procedure("is_column_get")
        .bind(None::<i64>)
        .fetch_all(pool)
        .await?)
}

/// Date of the newest stored report, if any.
pub async fn last_report<P: Pool>(pool: &P) -> Result<Option<NaiveDate>> {
    let last: Option<LastReport> = Call::procedure("rep_plates_last_get")
        .fetch_one(pool)
        .await?;
    Ok(last.and_then(|l| l.rep_date))
}

/// Recognition counters of device `ter_id` on `date`.
pub async fn stats<P: Pool>(pool: &P, ter_id: i64, date: NaiveDate) -> Result<PlateReport> {
    let stats: Option<PlateStats> = Call::procedure("rep_grz")
        .bind(ter_id)
        .bind(date)
        .fetch_one(pool)
        .await?;
    Ok(PlateReport::new(date, stats))
}

/// Store one device-day.
pub async fn store<P: Pool>(pool: &P, device: &Device, report: &PlateReport) -> Result<ExecuteResult> {
    Ok(Call::procedure("rep_plates_ins")
        .bind(device.ter_address.as_str())
        .bind(device.ter_type.as_str())
        .bind(device.ter_description.as_deref())
        .bind(report.total_transits)
        .bind(report.more_six)
        .bind(report.less_six)
        .bind(report.no_symbols)
        .bind(report.accuracy)
        .bind(device.cam_plate_mode)
        .bind(report.date)
        .run(pool)
        .await?)
}

async fn gather_one<S: Pool, T: Pool>(
    source: &S,
    target: &T,
    device: &Device,
    date: NaiveDate,
) -> Result<()> {
    let report = stats(source, device.ter_id, date).await?;
    store(target, device, &report).await?;
    Ok(())
}

/// Bring the stored report up to `today`.
///
/// Devices and the last stored date come from `target`; counters come from
/// `source`. Every device-day is fetched and stored concurrently. Returns
/// the number of device-days stored.
pub async fn backfill<S: Pool, T: Pool>(source: &S, target: &T, today: NaiveDate) -> Result<usize> {
    let (devices, last) = try_join(devices(target), last_report(target)).await?;
    let dates = plates_backfill(last, today);
    debug!(
        devices = devices.len(),
        days = dates.len(),
        last = ?last,
        "plate report backfill"
    );

    let jobs = devices
        .iter()
        .flat_map(|device| dates.iter().map(move |date| (device, *date)))
        .map(|(device, date)| gather_one(source, target, device, date));
    let stored = try_join_all(jobs).await?.len();

    info!(stored, "plate report updated");
    Ok(stored)
}
