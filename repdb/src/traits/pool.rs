//! Pool trait consumed by report producers, notifiers and web handlers

use crate::call::Cardinality;
use crate::error::Result;
use crate::record::ResultSet;
use crate::value::Value;
use async_trait::async_trait;

/// The call surface collaborators depend on.
///
/// Implemented by [`DbPool`](crate::DbPool) for every connector, so code
/// written against `&impl Pool` runs unchanged against MySQL or the
/// in-memory mock.
#[async_trait]
pub trait Pool: Send + Sync {
    /// Invoke a stored procedure and shape its first result set.
    async fn callproc(
        &self,
        name: &str,
        cardinality: Cardinality,
        params: Vec<Value>,
    ) -> Result<ResultSet>;

    /// Run a raw parameterized statement and shape its result.
    async fn execute(
        &self,
        statement: &str,
        cardinality: Cardinality,
        params: Vec<Value>,
    ) -> Result<ResultSet>;
}

#[async_trait]
impl<P: Pool + ?Sized> Pool for &P {
    async fn callproc(
        &self,
        name: &str,
        cardinality: Cardinality,
        params: Vec<Value>,
    ) -> Result<ResultSet> {
        (**self).callproc(name, cardinality, params).await
    }

    async fn execute(
        &self,
        statement: &str,
        cardinality: Cardinality,
        params: Vec<Value>,
    ) -> Result<ResultSet> {
        (**self).execute(statement, cardinality, params).await
    }
}
