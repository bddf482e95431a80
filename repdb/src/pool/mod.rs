//! The database access pool: bounded call slots, lazy connect with retry,
//! reconnect after connection loss, and orderly shutdown.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex, Notify, Semaphore};
use tracing::{debug, error, info, warn};

use crate::call::{Cardinality, CallRequest};
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::record::ResultSet;
use crate::traits::{Backend, Connector, Pool};
use crate::value::Value;

/// Lifecycle state of a [`DbPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolStatus {
    /// No backend yet, or the last connect failed fatally.
    Uninitialized,
    /// A connect or reconnect is in progress.
    Connecting,
    /// A backend is up.
    Ready,
    /// Disconnected. Terminal.
    Closed,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PoolStatus::Uninitialized => "uninitialized",
            PoolStatus::Connecting => "connecting",
            PoolStatus::Ready => "ready",
            PoolStatus::Closed => "closed",
        })
    }
}

struct Lifecycle<B> {
    backend: Option<Arc<B>>,
    // Bumped on every successful connect; lets a failed call tell whether
    // the backend it used has already been replaced.
    generation: u64,
    closed: bool,
}

struct Shared<C: Connector> {
    connector: C,
    config: ConnectionConfig,
    slots: Semaphore,
    max_slots: u32,
    lifecycle: Mutex<Lifecycle<C::Backend>>,
    status: watch::Sender<PoolStatus>,
    closing: AtomicBool,
    shutdown: Notify,
}

impl<C: Connector> Shared<C> {
    fn set_status(&self, status: PoolStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            debug!(endpoint = %self.config.endpoint(), from = %previous, to = %status, "pool status changed");
        }
    }
}

/// A bounded pool of connections to one database.
///
/// Construct one per database per process and hand clones (or references)
/// to every collaborator; clones share the same connections and state.
///
/// At most `pool_max` calls run at once. Each call holds a slot for its
/// whole duration and the slot is returned on every exit path, including
/// when the calling future is dropped.
///
/// # Example
///
/// ```ignore
/// use repdb::{Cardinality, ConnectionConfig, MySqlPool, Pool};
///
/// let config = ConnectionConfig::new("db1", 3306, "r", "x", "reports");
/// let pool = MySqlPool::mysql(config)?;
/// pool.connect().await?;
///
/// let day = pool
///     .callproc("rep_incomings", Cardinality::One, vec!["2024-01-08".into()])
///     .await?;
///
/// pool.disconnect().await?;
/// ```
pub struct DbPool<C: Connector> {
    shared: Arc<Shared<C>>,
}

impl<C: Connector> Clone for DbPool<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Connector> fmt::Debug for DbPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbPool")
            .field("endpoint", &self.shared.config.endpoint())
            .field("status", &self.status())
            .field("available", &self.available_connections())
            .field("max", &self.max_connections())
            .finish()
    }
}

impl<C: Connector> DbPool<C> {
    /// Create an unconnected pool. Nothing touches the network until the
    /// first [`connect`](Self::connect) or call.
    pub fn new(connector: C, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let max_slots = config.pool_max as u32;
        let (status, _) = watch::channel(PoolStatus::Uninitialized);
        Ok(Self {
            shared: Arc::new(Shared {
                connector,
                config,
                slots: Semaphore::new(max_slots as usize),
                max_slots,
                lifecycle: Mutex::new(Lifecycle {
                    backend: None,
                    generation: 0,
                    closed: false,
                }),
                status,
                closing: AtomicBool::new(false),
                shutdown: Notify::new(),
            }),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.shared.config
    }

    pub fn connector(&self) -> &C {
        &self.shared.connector
    }

    pub fn status(&self) -> PoolStatus {
        *self.shared.status.borrow()
    }

    /// Watch status transitions.
    pub fn subscribe(&self) -> watch::Receiver<PoolStatus> {
        self.shared.status.subscribe()
    }

    /// Call slots not currently held.
    pub fn available_connections(&self) -> usize {
        self.shared.slots.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.shared.max_slots as usize
    }

    /// Bring the pool up. Idempotent.
    ///
    /// Transient failures (server unreachable, gone away, shutting down)
    /// are retried every `reconnect_backoff_ms` until the backend comes up
    /// or the pool is disconnected. Fatal failures are returned after the
    /// first attempt and leave the pool uninitialized.
    pub async fn connect(&self) -> Result<()> {
        let mut life = self.shared.lifecycle.lock().await;
        self.establish(&mut life).await.map(|_| ())
    }

    /// Run a prepared request.
    pub async fn call(&self, request: CallRequest) -> Result<ResultSet> {
        let _slot = self
            .shared
            .slots
            .acquire()
            .await
            .map_err(|_| Error::Closed)?;

        let (backend, generation) = {
            let mut life = self.shared.lifecycle.lock().await;
            self.establish(&mut life).await?
        };

        let started = Instant::now();
        match backend.call(&request).await {
            Ok(fetched) => {
                debug!(
                    call = request.target.text(),
                    cardinality = %request.cardinality,
                    rows = fetched.rows.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "call completed"
                );
                Ok(ResultSet::shape(request.cardinality, fetched))
            }
            Err(err) if err.is_transient() => {
                warn!(
                    call = request.target.text(),
                    error = %err,
                    "connection lost during call, reconnecting"
                );
                drop(backend);
                Err(self.recover(generation, err).await)
            }
            Err(err) => {
                debug!(call = request.target.text(), error = %err, "call failed");
                Err(err)
            }
        }
    }

    /// Close the pool: stop any connect retries, wait for in-flight calls
    /// to finish, then close every connection. Safe before any successful
    /// connect, and idempotent.
    pub async fn disconnect(&self) -> Result<()> {
        let shared = &self.shared;
        shared.closing.store(true, Ordering::Release);
        shared.shutdown.notify_waiters();

        // Holding every slot means no call is running.
        let _drained = shared.slots.acquire_many(shared.max_slots).await.ok();

        let mut life = shared.lifecycle.lock().await;
        shared.slots.close();
        if life.closed {
            return Ok(());
        }
        life.closed = true;
        let backend = life.backend.take();
        shared.set_status(PoolStatus::Closed);

        match backend {
            Some(backend) => {
                info!(endpoint = %shared.config.endpoint(), "closing database pool");
                backend.close().await
            }
            None => Ok(()),
        }
    }

    // Return the live backend, connecting first if there is none. Runs with
    // the lifecycle lock held, so the check and the creation cannot
    // interleave with another task's.
    async fn establish(
        &self,
        life: &mut Lifecycle<C::Backend>,
    ) -> Result<(Arc<C::Backend>, u64)> {
        let shared = &self.shared;
        if life.closed || shared.closing.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        if let Some(backend) = &life.backend {
            return Ok((Arc::clone(backend), life.generation));
        }

        shared.set_status(PoolStatus::Connecting);
        let endpoint = shared.config.endpoint();
        let backoff = shared.config.backoff();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let shutdown = shared.shutdown.notified();
            tokio::pin!(shutdown);
            if shared.closing.load(Ordering::Acquire) {
                return Err(Error::Closed);
            }

            let outcome = tokio::select! {
                outcome = shared.connector.connect(&shared.config) => outcome,
                _ = &mut shutdown => return Err(Error::Closed),
            };

            match outcome {
                Ok(backend) => {
                    let backend = Arc::new(backend);
                    life.backend = Some(Arc::clone(&backend));
                    life.generation += 1;
                    shared.set_status(PoolStatus::Ready);
                    info!(%endpoint, attempt, "database pool ready");
                    return Ok((backend, life.generation));
                }
                Err(err) if err.is_transient() => {
                    warn!(%endpoint, attempt, error = %err, "database unreachable, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => {}
                        _ = &mut shutdown => return Err(Error::Closed),
                    }
                }
                Err(err) => {
                    shared.set_status(PoolStatus::Uninitialized);
                    error!(%endpoint, attempt, error = %err, "database connect failed");
                    return Err(err);
                }
            }
        }
    }

    // Replace the backend that failed under `generation`, at most once per
    // backend no matter how many calls saw it die, and turn the call's
    // error into the one its caller should see.
    async fn recover(&self, generation: u64, cause: Error) -> Error {
        let reconnect = async {
            let mut life = self.shared.lifecycle.lock().await;
            if life.generation == generation && life.backend.take().is_some() {
                self.shared.set_status(PoolStatus::Connecting);
            }
            self.establish(&mut life).await.map(|_| ())
        };

        let outcome = match self.shared.config.deadline() {
            Some(deadline) => match tokio::time::timeout(deadline, reconnect).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(
                        endpoint = %self.shared.config.endpoint(),
                        deadline_ms = deadline.as_millis() as u64,
                        "reconnect still in progress at deadline"
                    );
                    return cause.with_reconnected(false);
                }
            },
            None => reconnect.await,
        };

        match outcome {
            Ok(()) => cause.with_reconnected(true),
            Err(err) => err,
        }
    }
}

#[async_trait]
impl<C: Connector> Pool for DbPool<C> {
    async fn callproc(
        &self,
        name: &str,
        cardinality: Cardinality,
        params: Vec<Value>,
    ) -> Result<ResultSet> {
        self.call(CallRequest::procedure(name, cardinality, params)?)
            .await
    }

    async fn execute(
        &self,
        statement: &str,
        cardinality: Cardinality,
        params: Vec<Value>,
    ) -> Result<ResultSet> {
        self.call(CallRequest::statement(statement, cardinality, params))
            .await
    }
}

#[cfg(test)]
mod tests;
