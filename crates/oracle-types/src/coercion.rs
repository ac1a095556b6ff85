//! Raw value → Singer value coercion.
//!
//! The coercion for a column depends only on its schema, so it is resolved
//! once into a [`Coercion`] and then applied to every row. Resolution
//! follows a fixed precedence (first match wins):
//!
//! | schema                                        | coercion      |
//! |-----------------------------------------------|---------------|
//! | type includes `string`, format `singer.decimal` | `DecimalText` |
//! | type includes `integer`                       | `Integer`     |
//! | description is `blob`                         | `Blob`        |
//! | type includes `boolean`                       | `Boolean`     |
//! | anything else                                 | `Passthrough` |
//!
//! Nulls are passed through by every coercion.

use crate::number::{NumberParseError, OracleNumber};
use crate::value::OracleValue;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use singer_types::{RecordValue, Schema, DECIMAL_FORMAT};
use std::fmt;

/// `description` marking a column whose value is a binary payload.
pub const BLOB_DESCRIPTION: &str = "blob";

/// Longest decimal text emitted without normalization: 100 digits plus a
/// decimal point.
pub const MAX_DECIMAL_DIGITS: usize = 101;

/// Errors raised while coercing a value. All of them abort the row.
#[derive(Debug, thiserror::Error)]
pub enum CoercionError {
    #[error("Cannot coerce {actual} value with {coercion} coercion")]
    TypeMismatch {
        coercion: Coercion,
        actual: &'static str,
    },

    #[error(transparent)]
    InvalidDecimal(#[from] NumberParseError),

    #[error("Invalid integer: {0:?}")]
    InvalidInteger(String),

    #[error("Integer out of range: {0}")]
    IntegerOverflow(String),

    #[error("Non-finite float: {0}")]
    NonFiniteFloat(f64),
}

/// How one column's raw values become output values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Exact decimal rendered as a string
    DecimalText,
    /// Exact integer
    Integer,
    /// Base64 of a binary payload
    Blob,
    /// Numeric `1` is true; anything else is false
    Boolean,
    /// Value as fetched; NUMBER keeps its exact digits
    Passthrough,
}

impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DecimalText => "decimal-text",
            Self::Integer => "integer",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::Passthrough => "passthrough",
        };
        f.write_str(name)
    }
}

impl Coercion {
    /// Resolve the coercion for a column from its property schema.
    pub fn for_property(property: &Schema) -> Self {
        if property.includes_type("string") && property.has_format(DECIMAL_FORMAT) {
            Self::DecimalText
        } else if property.includes_type("integer") {
            Self::Integer
        } else if property.description.as_deref() == Some(BLOB_DESCRIPTION) {
            Self::Blob
        } else if property.includes_type("boolean") {
            Self::Boolean
        } else {
            Self::Passthrough
        }
    }

    /// Coerce one raw value.
    pub fn apply(self, value: OracleValue) -> Result<RecordValue, CoercionError> {
        if value.is_null() {
            return Ok(RecordValue::Null);
        }
        match self {
            Self::DecimalText => decimal_text(value),
            Self::Integer => integer(value),
            Self::Blob => blob(value),
            Self::Boolean => Ok(RecordValue::Bool(equals_one(&value))),
            Self::Passthrough => passthrough(value),
        }
    }

    fn mismatch(self, value: &OracleValue) -> CoercionError {
        CoercionError::TypeMismatch {
            coercion: self,
            actual: value.kind(),
        }
    }
}

fn decimal_text(value: OracleValue) -> Result<RecordValue, CoercionError> {
    let number = match value {
        OracleValue::Number(n) => n,
        OracleValue::Integer(i) => OracleNumber::from(i),
        OracleValue::Float(f) if f.is_finite() => f.to_string().parse()?,
        OracleValue::Float(f) => return Err(CoercionError::NonFiniteFloat(f)),
        OracleValue::Text(s) if s.len() <= MAX_DECIMAL_DIGITS => {
            return Ok(RecordValue::String(s));
        }
        OracleValue::Text(s) => s.parse()?,
        other => return Err(Coercion::DecimalText.mismatch(&other)),
    };

    let text = number.to_string();
    if text.len() > MAX_DECIMAL_DIGITS {
        Ok(RecordValue::String(number.normalize().to_string()))
    } else {
        Ok(RecordValue::String(text))
    }
}

fn integer(value: OracleValue) -> Result<RecordValue, CoercionError> {
    let i = match value {
        OracleValue::Integer(i) => i as i128,
        OracleValue::Number(n) => n
            .trunc_to_i128()
            .ok_or_else(|| CoercionError::IntegerOverflow(n.to_string()))?,
        OracleValue::Float(f) if !f.is_finite() => return Err(CoercionError::NonFiniteFloat(f)),
        OracleValue::Float(f) => {
            // i128 covers every finite f64 below 2^127
            let t = f.trunc();
            if t.abs() >= 2f64.powi(127) {
                return Err(CoercionError::IntegerOverflow(f.to_string()));
            }
            t as i128
        }
        OracleValue::Text(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| CoercionError::InvalidInteger(s.clone()))?,
        other => return Err(Coercion::Integer.mismatch(&other)),
    };
    Ok(RecordValue::Integer(i))
}

fn blob(value: OracleValue) -> Result<RecordValue, CoercionError> {
    match value {
        OracleValue::Binary(bytes) => Ok(RecordValue::String(BASE64.encode(bytes))),
        other => Err(Coercion::Blob.mismatch(&other)),
    }
}

// Only a numeric 1 is true. 0, 2, -1 and every text value are false.
fn equals_one(value: &OracleValue) -> bool {
    match value {
        OracleValue::Integer(i) => *i == 1,
        OracleValue::Number(n) => n.is_one(),
        OracleValue::Float(f) => *f == 1.0,
        _ => false,
    }
}

fn passthrough(value: OracleValue) -> Result<RecordValue, CoercionError> {
    match value {
        OracleValue::Null => Ok(RecordValue::Null),
        OracleValue::Integer(i) => Ok(RecordValue::Integer(i as i128)),
        OracleValue::Number(n) => Ok(RecordValue::Number(n.to_string())),
        OracleValue::Float(f) if f.is_finite() => Ok(RecordValue::Float(f)),
        OracleValue::Float(f) => Err(CoercionError::NonFiniteFloat(f)),
        OracleValue::Text(s) => Ok(RecordValue::String(s)),
        OracleValue::Timestamp(ts) => Ok(RecordValue::String(
            ts.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string(),
        )),
        other @ OracleValue::Binary(_) => Err(Coercion::Passthrough.mismatch(&other)),
    }
}
