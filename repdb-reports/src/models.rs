//! Result records of the report procedures

use chrono::{NaiveDate, NaiveDateTime};
use repdb::FromRow;
use rust_decimal::Decimal;
use serde::Serialize;

/// One day of parking income, as returned by `rep_incomings` and
/// `rep_consumables`.
///
/// Aggregates over a day without traffic come back NULL and read as zero.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[repdb(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Incomings {
    #[repdb(rename = "DayWeek")]
    #[serde(rename = "DayWeek")]
    pub day_week: String,
    #[repdb(default)]
    pub total_entries: i64,
    #[repdb(default)]
    pub total_exits: i64,
    #[repdb(default)]
    pub total_payments: i64,
    #[repdb(default)]
    pub cash_incomings: Decimal,
    #[repdb(default)]
    pub cashless_incomings: Decimal,
    #[repdb(default)]
    pub mobile_incomings: Decimal,
    #[repdb(default)]
    pub total_incomings: Decimal,
    #[repdb(default)]
    pub lost_tickets: i64,
    #[repdb(default)]
    pub total_exemptions: i64,
}

/// Raw plate recognition counters from `rep_grz`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct PlateStats {
    #[repdb(rename = "totalTransits", default)]
    pub total_transits: i64,
    #[repdb(rename = "more6symbols", default)]
    pub more_six: i64,
    #[repdb(rename = "less6symbols", default)]
    pub less_six: i64,
}

/// Plate recognition quality of one device for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateReport {
    pub date: NaiveDate,
    pub total_transits: i64,
    #[serde(rename = "more6symbols")]
    pub more_six: i64,
    #[serde(rename = "less6symbols")]
    pub less_six: i64,
    pub no_symbols: i64,
    /// Share of transits read with more than six symbols, percent
    pub accuracy: i64,
}

impl PlateReport {
    /// Derive the report for `date`. A day the procedure had no row for is
    /// all zeros.
    pub fn new(date: NaiveDate, stats: Option<PlateStats>) -> Self {
        let stats = stats.unwrap_or_default();
        // Percent rounded to two places, then truncated to whole percent
        let accuracy = if stats.total_transits > 0 {
            let percent = stats.more_six as f64 * 100.0 / stats.total_transits as f64;
            ((percent * 100.0).round() / 100.0).trunc() as i64
        } else {
            0
        };
        Self {
            date,
            total_transits: stats.total_transits,
            more_six: stats.more_six,
            less_six: stats.less_six,
            no_symbols: stats.total_transits - stats.more_six - stats.less_six,
            accuracy,
        }
    }
}

/// A lane device (`is_column_get`).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[repdb(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub ter_id: i64,
    pub ter_address: String,
    pub ter_type: String,
    pub ter_description: Option<String>,
    pub cam_plate_mode: Option<i64>,
}

/// Date of the newest stored plate report (`rep_plates_last_get`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct LastReport {
    #[repdb(rename = "repDate")]
    pub rep_date: Option<NaiveDate>,
}

/// Totals for a period (`ampp_consolidatedrep_get`).
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
#[repdb(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedReport {
    #[repdb(default)]
    pub entries: i64,
    #[repdb(default)]
    pub payments: i64,
    #[repdb(default)]
    pub exits: i64,
    #[repdb(default)]
    pub unpaid_exits: i64,
    #[repdb(default)]
    pub lost_tickets: i64,
    #[repdb(default)]
    pub lost_ticket_sum: Decimal,
    #[repdb(default)]
    pub total_payments: Decimal,
    #[repdb(default)]
    pub cash_payments: Decimal,
    #[repdb(default)]
    pub card_payments: Decimal,
    #[repdb(default)]
    pub troika_payments: Decimal,
    #[repdb(default)]
    pub other_payments: Decimal,
}

/// One parking session of the detailed report (`ampp_detailedrep_get`).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[repdb(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct DetailedEntry {
    pub idx: i64,
    pub parking_id: Option<String>,
    pub ticket_number: Option<String>,
    pub session_number: Option<String>,
    #[repdb(rename = "traEntryTS")]
    #[serde(rename = "traEntryTS")]
    pub tra_entry_ts: Option<NaiveDateTime>,
    #[repdb(rename = "traPayTS")]
    #[serde(rename = "traPayTS")]
    pub tra_pay_ts: Option<NaiveDateTime>,
    #[repdb(rename = "traExitTS")]
    #[serde(rename = "traExitTS")]
    pub tra_exit_ts: Option<NaiveDateTime>,
    pub session_duration: Option<String>,
    pub tra_plate: Option<String>,
    pub tra_pay_sum: Option<Decimal>,
    pub tra_pay_paid: Option<Decimal>,
    pub tra_pay_type: Option<String>,
    pub tra_pay_change: Option<Decimal>,
    pub ticket_without_change: Option<String>,
    #[repdb(rename = "payRRN")]
    #[serde(rename = "payRRN")]
    pub pay_rrn: Option<String>,
    pub session_status: Option<String>,
}
