//! Report periods and date helpers

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::{Error, Result};

/// Days gathered when the plate report has never run.
pub const PLATES_BACKFILL_DAYS: u64 = 30;

/// A Monday-to-Sunday reporting week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Week {
    pub monday: NaiveDate,
    /// ISO week number
    pub number: u32,
}

impl Week {
    /// The week containing `day`.
    pub fn containing(day: NaiveDate) -> Self {
        let monday = day - Days::new(u64::from(day.weekday().num_days_from_monday()));
        Self {
            monday,
            number: monday.iso_week().week(),
        }
    }

    /// The full week before the one containing `today`.
    pub fn previous(today: NaiveDate) -> Self {
        Self::containing(today - Days::new(7))
    }

    pub fn sunday(&self) -> NaiveDate {
        self.monday + Days::new(6)
    }

    /// Monday through Sunday.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.monday.iter_days().take(7)
    }
}

/// Dates the plate report still has to gather.
///
/// With no stored report: the [`PLATES_BACKFILL_DAYS`] days before
/// yesterday through yesterday. Otherwise from the last stored date
/// (re-gathered, since it may have been partial) through today.
pub fn plates_backfill(last: Option<NaiveDate>, today: NaiveDate) -> Vec<NaiveDate> {
    let (from, to) = match last {
        Some(last) => (last, today),
        None => {
            let to = today - Days::new(1);
            (to - Days::new(PLATES_BACKFILL_DAYS), to)
        }
    };
    from.iter_days().take_while(|d| *d <= to).collect()
}

/// Parse a `dd.mm.yyyy` form date as the start of that day.
pub fn parse_form_date(input: &str) -> Result<NaiveDateTime> {
    NaiveDate::parse_from_str(input.trim(), "%d.%m.%Y")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| Error::InvalidDate(input.to_string()))
}

/// Inclusive report period, both ends at start of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::InvalidPeriod { from, to });
        }
        Ok(Self {
            from: from.and_time(NaiveTime::MIN),
            to: to.and_time(NaiveTime::MIN),
        })
    }

    /// Build from the two `dd.mm.yyyy` fields of the report form.
    pub fn from_form(from: &str, to: &str) -> Result<Self> {
        let from = parse_form_date(from)?;
        let to = parse_form_date(to)?;
        Self::new(from.date(), to.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_previous_week() {
        // Wednesday
        let week = Week::previous(date(2024, 1, 17));
        assert_eq!(week.monday, date(2024, 1, 8));
        assert_eq!(week.sunday(), date(2024, 1, 14));
        assert_eq!(week.number, 2);
        let days: Vec<_> = week.days().collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days[6], date(2024, 1, 14));
    }

    #[test]
    fn test_previous_week_from_monday() {
        let week = Week::previous(date(2024, 1, 15));
        assert_eq!(week.monday, date(2024, 1, 8));
    }

    #[test]
    fn test_iso_week_across_new_year() {
        let week = Week::previous(date(2021, 1, 6));
        assert_eq!(week.monday, date(2020, 12, 28));
        assert_eq!(week.number, 53);
    }

    #[test]
    fn test_backfill_without_history() {
        let dates = plates_backfill(None, date(2024, 3, 1));
        assert_eq!(dates.len(), 31);
        assert_eq!(dates.first(), Some(&date(2024, 1, 30)));
        assert_eq!(dates.last(), Some(&date(2024, 2, 29)));
    }

    #[test]
    fn test_backfill_from_last_report() {
        let dates = plates_backfill(Some(date(2024, 3, 1)), date(2024, 3, 3));
        assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 2), date(2024, 3, 3)]);
        assert!(plates_backfill(Some(date(2024, 3, 4)), date(2024, 3, 3)).is_empty());
    }

    #[test]
    fn test_form_dates() {
        let period = Period::from_form("01.02.2024", " 29.02.2024").unwrap();
        assert_eq!(period.from.to_string(), "2024-02-01 00:00:00");
        assert_eq!(period.to.date(), date(2024, 2, 29));

        assert!(matches!(
            parse_form_date("2024-02-01"),
            Err(Error::InvalidDate(_))
        ));
        assert!(matches!(
            Period::from_form("02.02.2024", "01.02.2024"),
            Err(Error::InvalidPeriod { .. })
        ));
    }
}
