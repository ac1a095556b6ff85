//! Raw column values as returned by the row cursor.

use crate::number::OracleNumber;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// A raw value from an Oracle row.
///
/// The variants mirror the fetch buffers the tap asks the driver for:
/// NUMBER columns arrive as [`OracleNumber`], CLOB/NCLOB as text and BLOB as
/// bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleValue {
    Null,
    /// NUMBER fetched through a decimal buffer
    Number(OracleNumber),
    /// Integer already narrowed by the driver
    Integer(i64),
    /// BINARY_FLOAT / BINARY_DOUBLE
    Float(f64),
    /// VARCHAR2, CHAR, CLOB, and date/time columns selected through `to_char`
    Text(String),
    /// RAW and BLOB
    Binary(Vec<u8>),
    /// DATE / TIMESTAMP fetched natively
    Timestamp(NaiveDateTime),
}

impl OracleValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short variant name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<OracleNumber> for OracleValue {
    fn from(n: OracleNumber) -> Self {
        Self::Number(n)
    }
}

impl From<Decimal> for OracleValue {
    fn from(d: Decimal) -> Self {
        Self::Number(d.into())
    }
}

impl From<i64> for OracleValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for OracleValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for OracleValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for OracleValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<u8>> for OracleValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}

impl From<NaiveDateTime> for OracleValue {
    fn from(ts: NaiveDateTime) -> Self {
        Self::Timestamp(ts)
    }
}

impl<T: Into<OracleValue>> From<Option<T>> for OracleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
