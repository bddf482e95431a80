use std::time::Duration;

use futures::future::join_all;

use super::*;
use crate::call::Target;
use crate::mock::{Fault, MockConnector};
use crate::query::Call;
use crate::record::Record;
use crate::FromRow;

fn config(max: usize) -> ConnectionConfig {
    ConnectionConfig::new("db1", 3306, "r", "x", "reports")
        .pool(1, max)
        .reconnect_backoff(Duration::from_millis(100))
}

fn pool_with(mock: &MockConnector, max: usize) -> DbPool<MockConnector> {
    DbPool::new(mock.clone(), config(max)).unwrap()
}

fn incomings_row() -> Record {
    Record::from_iter([
        ("totalEntries", Value::Int(120)),
        ("totalExits", Value::Int(115)),
    ])
}

fn numbered(n: i64) -> Vec<Record> {
    (0..n).map(|i| Record::from_iter([("idx", i)])).collect()
}

async fn wait_in_flight(mock: &MockConnector, n: usize) {
    while mock.in_flight() < n {
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, FromRow)]
#[repdb(rename_all = "camelCase")]
struct Incomings {
    total_entries: i64,
    total_exits: i64,
    #[repdb(default)]
    lost_tickets: i64,
}

#[tokio::test]
async fn test_one_returns_single_row() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    let pool = pool_with(&mock, 10);

    let result = pool
        .callproc("rep_incomings", Cardinality::One, vec!["2024-01-08".into()])
        .await
        .unwrap();

    match result {
        ResultSet::Row(row) => {
            assert_eq!(row.get("totalEntries"), Some(&Value::Int(120)));
            assert_eq!(row.get("totalExits"), Some(&Value::Int(115)));
        }
        other => panic!("expected a row, got {:?}", other),
    }
    assert_eq!(pool.status(), PoolStatus::Ready);
    assert_eq!(pool.available_connections(), 10);
}

#[tokio::test]
async fn test_one_without_rows_is_sentinel() {
    let mock = MockConnector::new().with_rows("rep_plates_last_get", vec![]);
    let pool = pool_with(&mock, 2);

    let result = pool
        .callproc("rep_plates_last_get", Cardinality::One, vec![])
        .await
        .unwrap();
    assert_eq!(result, ResultSet::NoRows);
    assert_eq!(result.into_one().unwrap(), None);
}

#[tokio::test]
async fn test_all_and_many_keep_server_order() {
    let mock = MockConnector::new().with_rows("ampp_detailedrep_get", numbered(7));
    let pool = pool_with(&mock, 2);

    let all = pool
        .callproc("ampp_detailedrep_get", Cardinality::All, vec![])
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    let idx: Vec<_> = all.iter().map(|r| r.get("idx").cloned()).collect();
    assert_eq!(idx, (0..7).map(|i| Some(Value::Int(i))).collect::<Vec<_>>());

    let many = pool
        .callproc("ampp_detailedrep_get", Cardinality::Many(3), vec![])
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    assert_eq!(many.len(), 3);
    assert_eq!(many[2].get("idx"), Some(&Value::Int(2)));

    let again = pool
        .callproc("ampp_detailedrep_get", Cardinality::All, vec![])
        .await
        .unwrap();
    assert_eq!(again.len(), 7);
}

#[tokio::test]
async fn test_all_with_no_rows_is_empty_list() {
    let mock = MockConnector::new().with_rows("is_column_get", vec![]);
    let pool = pool_with(&mock, 2);

    let result = pool
        .callproc("is_column_get", Cardinality::All, vec![Value::Null])
        .await
        .unwrap();
    assert_eq!(result, ResultSet::Rows(vec![]));
}

#[tokio::test]
async fn test_none_returns_confirmation() {
    let mock = MockConnector::new().with_rows("is_processes_upd", vec![]);
    let pool = pool_with(&mock, 2);

    let result = pool
        .callproc(
            "is_processes_upd",
            Cardinality::None,
            vec!["plates".into(), 1_i64.into(), 0_i64.into()],
        )
        .await
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.into_done().unwrap().rows_affected, 1);
}

#[tokio::test]
async fn test_call_builder_decodes_typed_rows() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    let pool = pool_with(&mock, 2);

    let day: Option<Incomings> = Call::procedure("rep_incomings")
        .bind("2024-01-08")
        .fetch_one(&pool)
        .await
        .unwrap();
    let day = day.unwrap();
    assert_eq!(day.total_entries, 120);
    assert_eq!(day.total_exits, 115);
    assert_eq!(day.lost_tickets, 0);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].params, vec![Value::Text("2024-01-08".into())]);
    assert_eq!(requests[0].sql(), "CALL `rep_incomings`(?)");
}

#[tokio::test]
async fn test_invalid_procedure_name_never_reaches_backend() {
    let mock = MockConnector::new();
    let pool = pool_with(&mock, 2);

    let err = pool
        .callproc("rep_incomings; DROP TABLE x", Cardinality::One, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidProcedure(_)));
    assert_eq!(mock.calls(), 0);
    assert_eq!(mock.connect_attempts(), 0);
}

#[tokio::test]
async fn test_query_error_keeps_pool_ready() {
    let mock = MockConnector::new();
    let pool = pool_with(&mock, 2);

    let err = pool
        .callproc("missing_proc", Cardinality::One, vec![])
        .await
        .unwrap_err();
    match err {
        Error::Query { code, .. } => assert_eq!(code, 1305),
        other => panic!("expected a query error, got {:?}", other),
    }

    mock.set_rows("rep_consumables", vec![]);
    mock.fail_next_call(Fault::Query);
    let err = pool
        .callproc("rep_consumables", Cardinality::One, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Query { .. }));
    assert!(!err.is_retryable());
    assert_eq!(pool.status(), PoolStatus::Ready);
    assert_eq!(mock.backends_opened(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_first_calls_connect_once() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    mock.connect_delay(Duration::from_millis(50));
    let pool = pool_with(&mock, 10);

    let calls = (0..10).map(|_| pool.callproc("rep_incomings", Cardinality::One, vec![]));
    let results = join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(mock.connect_attempts(), 1);
    assert_eq!(mock.backends_opened(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_connect_is_idempotent() {
    let mock = MockConnector::new();
    mock.connect_delay(Duration::from_millis(50));
    let pool = pool_with(&mock, 4);

    let (a, b) = tokio::join!(pool.connect(), pool.connect());
    a.unwrap();
    b.unwrap();
    pool.connect().await.unwrap();
    assert_eq!(mock.backends_opened(), 1);
}

#[tokio::test]
async fn test_transient_call_error_reconnects() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    let pool = pool_with(&mock, 4);
    pool.connect().await.unwrap();

    mock.fail_next_call(Fault::Transient);
    let err = pool
        .callproc("rep_incomings", Cardinality::One, vec![])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transient {
            reconnected: true,
            ..
        }
    ));
    assert!(err.is_retryable());
    assert_eq!(pool.status(), PoolStatus::Ready);
    assert_eq!(mock.backends_opened(), 2);

    // The retry goes through on the new backend
    let retried = pool
        .callproc("rep_incomings", Cardinality::One, vec![])
        .await
        .unwrap();
    assert_eq!(retried.len(), 1);
    assert_eq!(mock.backends_opened(), 2);
}

#[tokio::test]
async fn test_execute_shapes_and_reconnects() {
    const SQL: &str = "SELECT idx FROM transits WHERE day = ?";
    let mock = MockConnector::new().with_rows(SQL, numbered(5));
    let pool = pool_with(&mock, 4);
    let day = || vec![Value::from("2024-01-08")];

    match pool.execute(SQL, Cardinality::One, day()).await.unwrap() {
        ResultSet::Row(row) => assert_eq!(row.get("idx"), Some(&Value::Int(0))),
        other => panic!("expected a row, got {:?}", other),
    }

    let all = pool
        .execute(SQL, Cardinality::All, day())
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    let idx: Vec<_> = all.iter().map(|r| r.get("idx").cloned()).collect();
    assert_eq!(idx, (0..5).map(|i| Some(Value::Int(i))).collect::<Vec<_>>());

    let many = pool.execute(SQL, Cardinality::Many(2), day()).await.unwrap();
    assert_eq!(many.len(), 2);

    mock.fail_next_call(Fault::Transient);
    let err = pool.execute(SQL, Cardinality::All, day()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Transient {
            reconnected: true,
            ..
        }
    ));
    assert!(err.is_retryable());
    assert_eq!(mock.backends_opened(), 2);

    let retried = pool.execute(SQL, Cardinality::All, day()).await.unwrap();
    assert_eq!(retried.len(), 5);
    assert_eq!(pool.status(), PoolStatus::Ready);
    assert!(mock
        .requests()
        .iter()
        .all(|r| r.target == Target::Statement(SQL.to_string())));
}

#[tokio::test]
async fn test_simultaneous_failures_reconnect_once() {
    let mock = MockConnector::new().with_rows("rep_consumables", vec![]);
    let pool = pool_with(&mock, 4);
    pool.connect().await.unwrap();

    mock.hold_calls();
    for _ in 0..4 {
        mock.fail_next_call(Fault::Transient);
    }
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.callproc("rep_consumables", Cardinality::One, vec![])
                    .await
            })
        })
        .collect();
    wait_in_flight(&mock, 4).await;
    mock.release_calls(4);

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(err.is_retryable(), "unexpected {:?}", err);
    }
    assert_eq!(mock.backends_opened(), 2);
    assert_eq!(pool.status(), PoolStatus::Ready);
}

#[tokio::test]
async fn test_fatal_connect_fails_on_first_attempt() {
    let mock = MockConnector::new().with_rows("rep_consumables", vec![]);
    mock.fail_connect(Fault::Fatal, 1);
    let pool = pool_with(&mock, 2);

    let err = pool.connect().await.unwrap_err();
    assert!(matches!(err, Error::FatalConnection(_)));
    assert_eq!(mock.connect_attempts(), 1);
    assert_eq!(pool.status(), PoolStatus::Uninitialized);

    // A later call tries again from scratch
    pool.callproc("rep_consumables", Cardinality::One, vec![])
        .await
        .unwrap();
    assert_eq!(mock.connect_attempts(), 2);
    assert_eq!(pool.status(), PoolStatus::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_transient_connect_is_retried() {
    let mock = MockConnector::new();
    mock.fail_connect(Fault::Transient, 3);
    let pool = pool_with(&mock, 2);

    pool.connect().await.unwrap();
    assert_eq!(mock.connect_attempts(), 4);
    assert_eq!(mock.backends_opened(), 1);
    assert_eq!(pool.status(), PoolStatus::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_call_releases_slot() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    let pool = pool_with(&mock, 2);
    pool.connect().await.unwrap();
    mock.hold_calls();

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        pool.callproc("rep_incomings", Cardinality::One, vec![]),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(pool.available_connections(), 2);
    assert_eq!(mock.in_flight(), 0);

    // Aborting a spawned call behaves the same
    let task = {
        let pool = pool.clone();
        tokio::spawn(async move {
            pool.callproc("rep_incomings", Cardinality::One, vec![])
                .await
        })
    };
    wait_in_flight(&mock, 1).await;
    assert_eq!(pool.available_connections(), 1);
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert_eq!(pool.available_connections(), 2);

    mock.release_calls(1);
    let row = pool
        .callproc("rep_incomings", Cardinality::One, vec![])
        .await
        .unwrap();
    assert_eq!(row.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_connect_leaves_pool_usable() {
    let mock = MockConnector::new().with_rows("rep_consumables", vec![]);
    mock.connect_delay(Duration::from_secs(1));
    let pool = pool_with(&mock, 2);

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        pool.callproc("rep_consumables", Cardinality::One, vec![]),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(pool.available_connections(), 2);
    assert_eq!(mock.backends_opened(), 0);

    pool.callproc("rep_consumables", Cardinality::One, vec![])
        .await
        .unwrap();
    assert_eq!(mock.backends_opened(), 1);
    assert_eq!(pool.status(), PoolStatus::Ready);
}

#[tokio::test]
async fn test_in_flight_calls_are_bounded() {
    let mock = MockConnector::new().with_rows("rep_consumables", vec![]);
    let pool = pool_with(&mock, 3);
    pool.connect().await.unwrap();
    mock.hold_calls();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.callproc("rep_consumables", Cardinality::One, vec![])
                    .await
            })
        })
        .collect();
    wait_in_flight(&mock, 3).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert_eq!(mock.in_flight(), 3);
    assert_eq!(pool.available_connections(), 0);

    mock.release_calls(10);
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(mock.peak_in_flight(), 3);
    assert_eq!(mock.calls(), 10);
    assert_eq!(pool.available_connections(), 3);
}

#[tokio::test]
async fn test_disconnect_before_connect() {
    let mock = MockConnector::new();
    let pool = pool_with(&mock, 2);

    pool.disconnect().await.unwrap();
    assert_eq!(pool.status(), PoolStatus::Closed);
    assert_eq!(mock.backends_opened(), 0);
    assert_eq!(mock.backends_closed(), 0);

    let err = pool
        .callproc("rep_consumables", Cardinality::One, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Closed));
    assert!(matches!(pool.connect().await, Err(Error::Closed)));
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let mock = MockConnector::new();
    let pool = pool_with(&mock, 2);
    pool.connect().await.unwrap();

    pool.disconnect().await.unwrap();
    pool.disconnect().await.unwrap();
    assert_eq!(mock.backends_closed(), 1);
    assert_eq!(pool.status(), PoolStatus::Closed);
}

#[tokio::test]
async fn test_disconnect_waits_for_in_flight_calls() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    let pool = pool_with(&mock, 2);
    pool.connect().await.unwrap();
    mock.hold_calls();

    let call = {
        let pool = pool.clone();
        tokio::spawn(async move {
            pool.callproc("rep_incomings", Cardinality::One, vec![])
                .await
        })
    };
    wait_in_flight(&mock, 1).await;

    let closing = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.disconnect().await })
    };
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert_eq!(mock.backends_closed(), 0);
    assert_ne!(pool.status(), PoolStatus::Closed);

    mock.release_calls(1);
    let row = call.await.unwrap().unwrap();
    assert_eq!(row.len(), 1);
    closing.await.unwrap().unwrap();
    assert_eq!(mock.backends_closed(), 1);
    assert_eq!(pool.status(), PoolStatus::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_stops_connect_retries() {
    let mock = MockConnector::new();
    mock.fail_connect(Fault::Transient, 1_000);
    let pool = pool_with(&mock, 2);

    let connecting = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.connect().await })
    };
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(mock.connect_attempts() >= 2);
    assert_eq!(pool.status(), PoolStatus::Connecting);

    pool.disconnect().await.unwrap();
    assert!(matches!(connecting.await.unwrap(), Err(Error::Closed)));
    assert_eq!(pool.status(), PoolStatus::Closed);
    assert_eq!(mock.backends_opened(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_deadline_reports_unrecovered() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    let config = config(2).reconnect_deadline(Some(Duration::from_millis(300)));
    let pool = DbPool::new(mock.clone(), config).unwrap();
    pool.connect().await.unwrap();

    mock.fail_next_call(Fault::Transient);
    mock.fail_connect(Fault::Transient, 1_000);
    let err = pool
        .callproc("rep_incomings", Cardinality::One, vec![])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transient {
            reconnected: false,
            ..
        }
    ));
    assert!(!err.is_retryable());
    assert_eq!(pool.status(), PoolStatus::Connecting);
    assert_eq!(pool.available_connections(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_call_after_deadline_waits_for_reconnect() {
    let mock = MockConnector::new().with_rows("rep_incomings", vec![incomings_row()]);
    let config = config(2).reconnect_deadline(Some(Duration::from_millis(300)));
    let pool = DbPool::new(mock.clone(), config).unwrap();
    pool.connect().await.unwrap();

    // Ten failed attempts at 100ms backoff outlast the deadline
    mock.fail_next_call(Fault::Transient);
    mock.fail_connect(Fault::Transient, 10);
    let err = pool
        .callproc("rep_incomings", Cardinality::One, vec![])
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
    assert_eq!(pool.status(), PoolStatus::Connecting);

    let started = tokio::time::Instant::now();
    let result = pool
        .callproc("rep_incomings", Cardinality::One, vec![])
        .await
        .unwrap();
    assert!(started.elapsed() > Duration::from_millis(300));
    assert!(matches!(result, ResultSet::Row(_)));
    assert_eq!(pool.status(), PoolStatus::Ready);
    assert_eq!(mock.backends_opened(), 2);
}

#[tokio::test]
async fn test_status_transitions_are_observable() {
    let mock = MockConnector::new();
    let pool = pool_with(&mock, 2);
    let mut status = pool.subscribe();
    assert_eq!(*status.borrow_and_update(), PoolStatus::Uninitialized);

    pool.connect().await.unwrap();
    assert!(status.has_changed().unwrap());
    assert_eq!(*status.borrow_and_update(), PoolStatus::Ready);

    pool.disconnect().await.unwrap();
    assert_eq!(*status.borrow_and_update(), PoolStatus::Closed);
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = DbPool::new(MockConnector::new(), config(2).pool(3, 2)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
