//! FromValue trait for converting database values to Rust types

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Trait for types that can be constructed from a database value.
///
/// This is automatically implemented for common Rust types and can
/// be manually implemented for custom types (e.g., enums).
pub trait FromValue: Sized {
    /// Convert a database value to this type.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    Error::TypeConversion {
        expected,
        actual: value.type_name().to_string(),
    }
}

// Report procedures aggregate with SUM(), which MySQL returns as DECIMAL
// text, so integers also accept integral text.
macro_rules! from_value_int {
    ($($ty:ty => $name:literal),*) => {
        $(impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                let out_of_range = |shown: String| Error::TypeConversion {
                    expected: $name,
                    actual: format!("{} out of range", shown),
                };
                match value {
                    Value::Int(v) => v.try_into().map_err(|_| out_of_range(format!("int({})", v))),
                    Value::UInt(v) => v.try_into().map_err(|_| out_of_range(format!("uint({})", v))),
                    Value::Bool(v) => Ok(<$ty>::from(v)),
                    Value::Decimal(v) if v.fract().is_zero() => v
                        .normalize()
                        .to_string()
                        .parse()
                        .map_err(|_| out_of_range(format!("decimal({})", v))),
                    Value::Text(ref v) => {
                        let trimmed = v.strip_suffix(".0").unwrap_or(v);
                        trimmed.parse().map_err(|_| Error::TypeConversion {
                            expected: $name,
                            actual: format!("text({})", v),
                        })
                    }
                    _ => Err(mismatch($name, &value)),
                }
            }
        })*
    };
}

from_value_int!(
    i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64",
    u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64"
);

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            _ => Err(mismatch("bool", &value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::UInt(v) => Ok(v as f64),
            Value::Text(ref v) => v.parse().map_err(|_| Error::TypeConversion {
                expected: "f64",
                actual: format!("text({})", v),
            }),
            _ => Err(mismatch("f64", &value)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|e| Error::TypeConversion {
                expected: "utf8 string",
                actual: format!("invalid utf8: {}", e),
            }),
            Value::Int(v) => Ok(v.to_string()),
            Value::UInt(v) => Ok(v.to_string()),
            Value::Decimal(v) => Ok(v.to_string()),
            Value::Date(v) => Ok(v.format("%Y-%m-%d").to_string()),
            Value::DateTime(v) => Ok(v.format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::Time(v) => Ok(v.format("%H:%M:%S").to_string()),
            _ => Err(mismatch("string", &value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            _ => Err(mismatch("bytes", &value)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            Value::Text(ref v) => {
                NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| Error::TypeConversion {
                    expected: "date",
                    actual: format!("text({})", v),
                })
            }
            _ => Err(mismatch("date", &value)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => Ok(v.and_time(NaiveTime::MIN)),
            Value::Text(ref v) => NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S")
                .map_err(|_| Error::TypeConversion {
                    expected: "datetime",
                    actual: format!("text({})", v),
                }),
            _ => Err(mismatch("datetime", &value)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(v) => Ok(v),
            Value::DateTime(v) => Ok(v.time()),
            _ => Err(mismatch("time", &value)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Int(v) => Ok(Decimal::from(v)),
            Value::UInt(v) => Ok(Decimal::from(v)),
            Value::Float(v) => Decimal::try_from(v).map_err(|_| Error::TypeConversion {
                expected: "decimal",
                actual: format!("float({})", v),
            }),
            Value::Text(ref v) => v.parse().map_err(|_| Error::TypeConversion {
                expected: "decimal",
                actual: format!("invalid decimal string: {}", v),
            }),
            _ => Err(mismatch("decimal", &value)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Text(v) => serde_json::from_str(&v).map_err(|e| Error::TypeConversion {
                expected: "json",
                actual: format!("invalid json: {}", e),
            }),
            _ => Err(mismatch("json", &value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_from_sum_text() {
        assert_eq!(i64::from_value(Value::Text("120".into())).unwrap(), 120);
        assert_eq!(u32::from_value(Value::Text("115".into())).unwrap(), 115);
        assert!(i32::from_value(Value::Text("1.5".into())).is_err());
    }

    #[test]
    fn test_int_range_checked() {
        assert_eq!(u8::from_value(Value::Int(255)).unwrap(), 255);
        let err = u8::from_value(Value::Int(-1)).unwrap_err();
        assert!(matches!(err, Error::TypeConversion { expected: "u8", .. }));
    }

    #[test]
    fn test_decimal_from_text() {
        let d = Decimal::from_value(Value::Text("1520.50".into())).unwrap();
        assert_eq!(d.to_string(), "1520.50");
    }

    #[test]
    fn test_option_null() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert!(i64::from_value(Value::Null).is_err());
    }
}
