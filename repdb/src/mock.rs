//! Scripted in-memory connector for testing pool consumers
//!
//! Enabled with the `mock` feature. Responses are registered per procedure
//! name or statement text; connect and call failures are queued ahead of
//! time; counters expose what the pool did.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::call::{CallRequest, Cardinality, Target};
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::record::{ExecuteResult, Fetched, Record};
use crate::traits::{Backend, Connector};

/// Failure classes a mock connect or call can be scripted to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Connection refused on connect, server gone away on a call
    Transient,
    /// Access denied
    Fatal,
    /// Server error unrelated to the connection
    Query,
}

impl Fault {
    fn on_connect(self) -> Error {
        match self {
            Fault::Transient => Error::transient(Some(2003), "Can't connect to MySQL server"),
            Fault::Fatal => Error::FatalConnection("1045 (28000): Access denied".into()),
            Fault::Query => Error::FatalConnection("1193 (HY000): Unknown system variable".into()),
        }
    }

    fn on_call(self) -> Error {
        match self {
            Fault::Transient => Error::transient(Some(2006), "MySQL server has gone away"),
            Fault::Fatal => Error::FatalConnection("1045 (28000): Access denied".into()),
            Fault::Query => Error::Query {
                code: 1644,
                state: "45000".into(),
                message: "scripted failure".into(),
            },
        }
    }
}

struct MockState {
    responses: Mutex<HashMap<String, Vec<Record>>>,
    connect_faults: Mutex<VecDeque<Fault>>,
    call_faults: Mutex<VecDeque<Fault>>,
    connect_delay: Mutex<Option<Duration>>,
    held: AtomicBool,
    gate: Semaphore,
    connect_attempts: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requests: Mutex<Vec<CallRequest>>,
}

/// In-memory [`Connector`]. Clones share state, so a test keeps one
/// handle while the pool owns another.
#[derive(Clone)]
pub struct MockConnector {
    state: Arc<MockState>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                responses: Mutex::new(HashMap::new()),
                connect_faults: Mutex::new(VecDeque::new()),
                call_faults: Mutex::new(VecDeque::new()),
                connect_delay: Mutex::new(None),
                held: AtomicBool::new(false),
                gate: Semaphore::new(0),
                connect_attempts: AtomicUsize::new(0),
                opened: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register the rows a procedure or statement returns.
    pub fn with_rows(self, target: impl Into<String>, rows: Vec<Record>) -> Self {
        self.set_rows(target, rows);
        self
    }

    pub fn set_rows(&self, target: impl Into<String>, rows: Vec<Record>) {
        lock(&self.state.responses).insert(target.into(), rows);
    }

    /// Fail the next `times` connect attempts.
    pub fn fail_connect(&self, fault: Fault, times: usize) {
        let mut faults = lock(&self.state.connect_faults);
        faults.extend(std::iter::repeat(fault).take(times));
    }

    /// Fail the next call that reaches the backend.
    pub fn fail_next_call(&self, fault: Fault) {
        lock(&self.state.call_faults).push_back(fault);
    }

    /// Make every connect attempt take `delay`.
    pub fn connect_delay(&self, delay: Duration) {
        *lock(&self.state.connect_delay) = Some(delay);
    }

    /// Park calls inside the backend until [`release_calls`](Self::release_calls).
    pub fn hold_calls(&self) {
        self.state.held.store(true, Ordering::SeqCst);
    }

    /// Let `n` parked (or future) calls through.
    pub fn release_calls(&self, n: usize) {
        self.state.gate.add_permits(n);
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn backends_opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn backends_closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls seen inside the backend at once.
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    /// Every request that reached a backend, in arrival order.
    pub fn requests(&self) -> Vec<CallRequest> {
        lock(&self.state.requests).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Connector for MockConnector {
    type Backend = MockBackend;

    async fn connect(&self, _config: &ConnectionConfig) -> Result<MockBackend> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.state.connect_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let fault = lock(&self.state.connect_faults).pop_front();
        if let Some(fault) = fault {
            return Err(fault.on_connect());
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockBackend {
            state: Arc::clone(&self.state),
        })
    }
}

/// Backend produced by [`MockConnector`].
pub struct MockBackend {
    state: Arc<MockState>,
}

struct InFlight<'a>(&'a MockState);

impl<'a> InFlight<'a> {
    fn enter(state: &'a MockState) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak.fetch_max(now, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn call(&self, request: &CallRequest) -> Result<Fetched> {
        let state = &*self.state;
        state.calls.fetch_add(1, Ordering::SeqCst);
        lock(&state.requests).push(request.clone());
        let _in_flight = InFlight::enter(state);

        if state.held.load(Ordering::SeqCst) {
            state
                .gate
                .acquire()
                .await
                .map_err(|_| Error::Driver("mock gate closed".into()))?
                .forget();
        }

        let fault = lock(&state.call_faults).pop_front();
        if let Some(fault) = fault {
            return Err(fault.on_call());
        }

        let rows = lock(&state.responses).get(request.target.text()).cloned();
        let mut rows = match (rows, &request.target) {
            (Some(rows), _) => rows,
            (None, Target::Procedure(name)) => {
                return Err(Error::Query {
                    code: 1305,
                    state: "42000".into(),
                    message: format!("PROCEDURE {} does not exist", name),
                })
            }
            (None, Target::Statement(_)) => Vec::new(),
        };

        if let Some(limit) = request.cardinality.limit() {
            rows.truncate(limit);
        }
        let summary = match request.cardinality {
            Cardinality::None => ExecuteResult {
                rows_affected: 1,
                last_insert_id: None,
            },
            _ => ExecuteResult::default(),
        };
        Ok(Fetched { rows, summary })
    }

    async fn close(&self) -> Result<()> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
