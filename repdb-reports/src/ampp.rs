//! Parking operator (AMPP) period reports

use repdb::{Call, Pool};

use crate::error::Result;
use crate::models::{ConsolidatedReport, DetailedEntry};
use crate::period::Period;

/// Totals over `period`. A period without data reads as all zeros.
pub async fn consolidated<P: Pool>(pool: &P, period: &Period) -> Result<ConsolidatedReport> {
    let report: Option<ConsolidatedReport> = Call::procedure("ampp_consolidatedrep_get")
        .bind(period.from)
        .bind(period.to)
        .fetch_one(pool)
        .await?;
    Ok(report.unwrap_or_default())
}

/// Every session of `parking_id` in `period`, in the procedure's order.
pub async fn detailed<P: Pool>(
    pool: &P,
    parking_id: &str,
    period: &Period,
) -> Result<Vec<DetailedEntry>> {
    Ok(Call::procedure("ampp_detailedrep_get")
        .bind(parking_id)
        .bind(period.from)
        .bind(period.to)
        .fetch_all(pool)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repdb::mock::MockConnector;
    use repdb::{ConnectionConfig, DbPool, Record, Value};
    use rust_decimal::Decimal;

    fn pool(mock: &MockConnector) -> DbPool<MockConnector> {
        let config = ConnectionConfig::new("db1", 3306, "r", "x", "wisepark");
        DbPool::new(mock.clone(), config).unwrap()
    }

    fn session(idx: i64) -> Record {
        Record::from_iter([
            ("idx", Value::Int(idx)),
            ("parkingId", Value::from("P-01")),
            ("ticketNumber", Value::from(format!("T{}", idx))),
            ("sessionNumber", Value::Null),
            ("traEntryTS", Value::Null),
            ("traPayTS", Value::Null),
            ("traExitTS", Value::Null),
            ("sessionDuration", Value::from("26:05:09")),
            ("traPlate", Value::from("A123BC77")),
            ("traPaySum", Value::Text("150.00".into())),
            ("traPayPaid", Value::Text("200.00".into())),
            ("traPayType", Value::from("cash")),
            ("traPayChange", Value::Text("50.00".into())),
            ("ticketWithoutChange", Value::Null),
            ("payRRN", Value::Null),
            ("sessionStatus", Value::from("closed")),
        ])
    }

    #[tokio::test]
    async fn test_consolidated_zero_when_empty() {
        let mock = MockConnector::new().with_rows("ampp_consolidatedrep_get", vec![]);
        let period = Period::from_form("01.01.2024", "31.01.2024").unwrap();

        let report = consolidated(&pool(&mock), &period).await.unwrap();
        assert_eq!(report, ConsolidatedReport::default());
        assert_eq!(
            mock.requests()[0].params,
            vec![Value::DateTime(period.from), Value::DateTime(period.to)]
        );
    }

    #[tokio::test]
    async fn test_detailed_keeps_order() {
        let mock = MockConnector::new()
            .with_rows("ampp_detailedrep_get", (1..=7).map(session).collect());
        let period = Period::from_form("01.01.2024", "31.01.2024").unwrap();

        let rows = detailed(&pool(&mock), "P-01", &period).await.unwrap();
        let idx: Vec<i64> = rows.iter().map(|r| r.idx).collect();
        assert_eq!(idx, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(rows[0].tra_pay_change, Some(Decimal::new(50, 0)));
        assert_eq!(rows[0].session_duration.as_deref(), Some("26:05:09"));
        assert_eq!(mock.requests()[0].params[0], Value::from("P-01"));
    }
}
