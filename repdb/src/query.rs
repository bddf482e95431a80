//! Fluent call builder

use crate::call::{Cardinality, Target};
use crate::error::Result;
use crate::record::{ExecuteResult, ResultSet};
use crate::traits::{FromRow, Pool, ToValue};
use crate::value::Value;

/// A call builder that supports fluent parameter binding.
///
/// # Example
///
/// ```ignore
/// use repdb::{Call, Pool};
///
/// async fn devices(pool: &impl Pool) -> repdb::Result<Vec<Device>> {
///     Call::procedure("is_column_get")
///         .bind(None::<i64>)
///         .fetch_all(pool)
///         .await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Call {
    target: Target,
    params: Vec<Value>,
}

impl Call {
    /// Call a stored procedure. The name is checked when the call runs.
    pub fn procedure(name: impl Into<String>) -> Self {
        Self {
            target: Target::Procedure(name.into()),
            params: Vec::new(),
        }
    }

    /// Run a raw statement with `?` placeholders.
    pub fn statement(text: impl Into<String>) -> Self {
        Self {
            target: Target::Statement(text.into()),
            params: Vec::new(),
        }
    }

    /// Bind a single value. Values are passed positionally, in order.
    pub fn bind<T: ToValue>(mut self, value: T) -> Self {
        self.params.push(value.to_value());
        self
    }

    /// Bind multiple values.
    pub fn bind_all<T: ToValue>(mut self, values: &[T]) -> Self {
        for value in values {
            self.params.push(value.to_value());
        }
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Get the bound parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Run with an explicit cardinality and return the shaped result.
    pub async fn fetch<P: Pool>(self, cardinality: Cardinality, pool: &P) -> Result<ResultSet> {
        match self.target {
            Target::Procedure(name) => pool.callproc(&name, cardinality, self.params).await,
            Target::Statement(text) => pool.execute(&text, cardinality, self.params).await,
        }
    }

    /// Fetch and decode the single row, if any.
    pub async fn fetch_one<T: FromRow, P: Pool>(self, pool: &P) -> Result<Option<T>> {
        self.fetch(Cardinality::One, pool).await?.decode_one()
    }

    /// Fetch and decode up to `n` rows.
    pub async fn fetch_many<T: FromRow, P: Pool>(self, n: usize, pool: &P) -> Result<Vec<T>> {
        self.fetch(Cardinality::Many(n), pool).await?.decode_rows()
    }

    /// Fetch and decode every row.
    pub async fn fetch_all<T: FromRow, P: Pool>(self, pool: &P) -> Result<Vec<T>> {
        self.fetch(Cardinality::All, pool).await?.decode_rows()
    }

    /// Run for effect only.
    pub async fn run<P: Pool>(self, pool: &P) -> Result<ExecuteResult> {
        self.fetch(Cardinality::None, pool).await?.into_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_order() {
        let call = Call::procedure("rep_grz")
            .bind(7_i64)
            .bind("2024-01-08")
            .bind(None::<i64>);
        assert_eq!(
            call.params(),
            &[Value::Int(7), Value::Text("2024-01-08".into()), Value::Null]
        );
        assert_eq!(call.target(), &Target::Procedure("rep_grz".into()));
    }

    #[test]
    fn test_bind_all() {
        let call = Call::statement("SELECT ?, ?").bind_all(&[1_i64, 2]);
        assert_eq!(call.params(), &[Value::Int(1), Value::Int(2)]);
    }
}
