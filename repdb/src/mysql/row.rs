//! Materializing mysql_async rows

use crate::error::{Error, Result};
use crate::record::Record;
use mysql_async::Row as MySqlAsyncRow;

use super::types::from_mysql_value;

/// Copy a driver row into an owned [`Record`], keeping column order.
pub(crate) fn record_from_mysql(row: MySqlAsyncRow) -> Result<Record> {
    let columns = row.columns_ref();
    let mut record = Record::with_capacity(columns.len());

    for (i, column) in columns.iter().enumerate() {
        let column_name = column.name_str().to_string();
        let mysql_value = row
            .as_ref(i)
            .ok_or_else(|| Error::ColumnNotFound(column_name.clone()))?
            .clone();
        record.insert(column_name, from_mysql_value(mysql_value)?);
    }

    Ok(record)
}
