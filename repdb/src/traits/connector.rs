//! Driver seam: how a pool opens a backend and runs calls on it

use crate::call::CallRequest;
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::record::Fetched;
use async_trait::async_trait;

/// Opens backends for a [`DbPool`](crate::DbPool).
///
/// `connect` must classify failures: connection-lost class errors as
/// [`Error::Transient`](crate::Error::Transient) so the pool retries them,
/// everything else as fatal.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Backend: Backend;

    /// Open a backend and prove it can reach the database.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Backend>;
}

/// A live set of connections to one database.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Run one call on one connection.
    ///
    /// At most `request.cardinality.limit()` rows are returned, fully
    /// materialized; any remaining rows and result sets are drained before
    /// the connection goes back to the backend.
    async fn call(&self, request: &CallRequest) -> Result<Fetched>;

    /// Close every connection.
    async fn close(&self) -> Result<()>;
}
