//! MySQL connector and backend

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{
    Opts, OptsBuilder, Pool as MysqlAsyncPool, PoolConstraints, PoolOpts, QueryResult,
};
use tracing::debug;

use crate::call::{CallRequest, Target};
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::pool::DbPool;
use crate::record::{ExecuteResult, Fetched, Record};
use crate::traits::{Backend, Connector};

use super::errors::connect_error;
use super::row::record_from_mysql;
use super::types::to_mysql_value;

/// A [`DbPool`] over MySQL.
pub type MySqlPool = DbPool<MySqlConnector>;

impl DbPool<MySqlConnector> {
    /// Create an unconnected MySQL pool.
    pub fn mysql(config: ConnectionConfig) -> Result<Self> {
        DbPool::new(MySqlConnector, config)
    }
}

/// Opens `mysql_async` pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl MySqlConnector {
    /// Translate connection settings into `mysql_async` options.
    pub fn opts(config: &ConnectionConfig) -> Result<Opts> {
        let constraints = PoolConstraints::new(config.pool_min, config.pool_max).ok_or_else(|| {
            Error::Config(format!(
                "invalid pool bounds {}..{}",
                config.pool_min, config.pool_max
            ))
        })?;

        let builder = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.login.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()))
            .pool_opts(PoolOpts::default().with_constraints(constraints));

        Ok(builder.into())
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Backend = MySqlBackend;

    async fn connect(&self, config: &ConnectionConfig) -> Result<MySqlBackend> {
        let inner = MysqlAsyncPool::new(Self::opts(config)?);

        // mysql_async connects lazily; take one connection now so refused
        // connections and bad credentials show up here, not on the first call.
        let probe = async {
            let mut conn = inner.get_conn().await?;
            conn.ping().await?;
            Ok::<(), mysql_async::Error>(())
        };
        match probe.await {
            Ok(()) => Ok(MySqlBackend { inner }),
            Err(err) => {
                let _ = inner.disconnect().await;
                Err(connect_error(err))
            }
        }
    }
}

/// A live `mysql_async` pool.
///
/// Cloning is cheap: the inner pool is `Arc`-backed.
#[derive(Clone)]
pub struct MySqlBackend {
    inner: MysqlAsyncPool,
}

impl MySqlBackend {
    /// Get a reference to the underlying mysql_async pool.
    pub fn inner(&self) -> &MysqlAsyncPool {
        &self.inner
    }
}

#[async_trait]
impl Backend for MySqlBackend {
    async fn call(&self, request: &CallRequest) -> Result<Fetched> {
        let sql = request.sql();
        let params = request
            .params
            .iter()
            .map(to_mysql_value)
            .collect::<Result<Vec<_>>>()?;
        let limit = request.cardinality.limit();

        let mut conn = self.inner.get_conn().await?;

        // DDL such as CREATE PROCEDURE is not preparable; parameterless
        // statements go over the text protocol.
        let rows = match (&request.target, params.is_empty()) {
            (Target::Statement(_), true) => {
                read_rows(conn.query_iter(sql.as_str()).await?, limit).await?
            }
            _ => read_rows(conn.exec_iter(sql.as_str(), params).await?, limit).await?,
        };

        let summary = ExecuteResult {
            rows_affected: conn.affected_rows(),
            last_insert_id: conn.last_insert_id(),
        };
        debug!(sql = %sql, rows = rows.len(), "mysql call finished");

        Ok(Fetched { rows, summary })
    }

    async fn close(&self) -> Result<()> {
        self.inner.clone().disconnect().await?;
        Ok(())
    }
}

async fn read_rows<P: Protocol>(
    mut result: QueryResult<'_, '_, P>,
    limit: Option<usize>,
) -> Result<Vec<Record>> {
    let mut rows = Vec::new();
    if limit != Some(0) {
        while let Some(row) = result.next().await? {
            rows.push(record_from_mysql(row)?);
            if limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
        }
    }
    // Procedures end with a status result; unread rows and sets must be
    // consumed before the connection can serve the next call.
    result.drop_result().await?;
    Ok(rows)
}
