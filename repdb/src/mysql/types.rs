//! Value conversion between repdb and mysql_async

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::Value as MySqlValue;

/// Convert a repdb parameter into a mysql_async value.
///
/// Fails only for dates whose year MySQL cannot represent.
pub fn to_mysql_value(value: &Value) -> Result<MySqlValue> {
    let value = match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::Int(v) => MySqlValue::Int(*v),
        Value::UInt(v) => MySqlValue::UInt(*v),
        Value::Float(v) => MySqlValue::Double(*v),
        Value::Text(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
        Value::Date(v) => date_time(*v, NaiveTime::MIN)?,
        Value::DateTime(v) => date_time(v.date(), v.time())?,
        Value::Time(v) => MySqlValue::Time(
            false,
            0,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.nanosecond() / 1000,
        ),
        Value::Decimal(v) => MySqlValue::from(v.to_string()),
        Value::Json(v) => MySqlValue::from(v.to_string()),
    };
    Ok(value)
}

fn date_time(date: NaiveDate, time: NaiveTime) -> Result<MySqlValue> {
    let year = u16::try_from(date.year()).map_err(|_| Error::TypeConversion {
        expected: "date with year 0..=65535",
        actual: date.to_string(),
    })?;
    Ok(MySqlValue::Date(
        year,
        date.month() as u8,
        date.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second() as u8,
        time.nanosecond() / 1000,
    ))
}

/// Convert a mysql_async column value into a repdb value.
///
/// Text-protocol and DECIMAL columns arrive as bytes; valid UTF-8 becomes
/// [`Value::Text`].
pub fn from_mysql_value(value: MySqlValue) -> Result<Value> {
    match value {
        MySqlValue::NULL => Ok(Value::Null),
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Ok(Value::Text(s)),
            Err(e) => Ok(Value::Bytes(e.into_bytes())),
        },
        MySqlValue::Int(v) => Ok(Value::Int(v)),
        MySqlValue::UInt(v) => Ok(Value::UInt(v)),
        MySqlValue::Float(v) => Ok(Value::Float(v.into())),
        MySqlValue::Double(v) => Ok(Value::Float(v)),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "date",
                    actual: format!("{}-{}-{}", year, month, day),
                })?;
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                return Ok(Value::Date(date));
            }
            let time = NaiveTime::from_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "time",
                    actual: format!("{}:{}:{}.{}", hour, min, sec, micro),
                })?;
            Ok(Value::DateTime(NaiveDateTime::new(date, time)))
        }
        MySqlValue::Time(is_neg, days, hours, mins, secs, micro) => {
            // TIME columns can hold durations; anything outside a wall-clock
            // day is kept as `[-]H:MM:SS` text
            if is_neg || days > 0 || hours >= 24 {
                return Ok(Value::Text(format!(
                    "{}{}:{:02}:{:02}",
                    if is_neg { "-" } else { "" },
                    days * 24 + hours as u32,
                    mins,
                    secs
                )));
            }
            NaiveTime::from_hms_micro_opt(hours as u32, mins as u32, secs as u32, micro)
                .map(Value::Time)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "time",
                    actual: format!("{}:{}:{}.{}", hours, mins, secs, micro),
                })
        }
    }
}
