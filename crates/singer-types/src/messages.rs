//! Singer message shapes.
//!
//! Messages serialize to the Singer JSON-lines wire format:
//!
//! ```json
//! {"type":"SCHEMA","stream":"ORCL-ROOT-CHICKEN","schema":{...},"key_properties":["ID"]}
//! {"type":"RECORD","stream":"ORCL-ROOT-CHICKEN","record":{"ID":1},"version":1,"time_extracted":"2024-01-01T00:00:00.000000Z"}
//! ```

use crate::schema::Schema;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;

/// A serialization-safe output value.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Null,
    Bool(bool),
    /// Exact integer; wide enough for NUMBER(38)
    Integer(i128),
    Float(f64),
    /// Exact decimal in its canonical text form, e.g. `12.50` or `1E+130`.
    /// Written to JSON as a bare number with every digit kept.
    Number(String),
    String(String),
}

impl RecordValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&str> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl From<bool> for RecordValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for RecordValue {
    fn from(i: i64) -> Self {
        Self::Integer(i as i128)
    }
}

impl From<i128> for RecordValue {
    fn from(i: i128) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for RecordValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for RecordValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl Serialize for RecordValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => match i64::try_from(*i) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_i128(*i),
            },
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Number(n) => RawValue::from_string(n.clone())
                .map_err(|e| S::Error::custom(format!("invalid number {n:?}: {e}")))?
                .serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

struct RecordValueVisitor;

impl<'de> Visitor<'de> for RecordValueVisitor {
    type Value = RecordValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("null, a boolean, a number or a string")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RecordValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RecordValue::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(RecordValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(RecordValue::Integer(v as i128))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(RecordValue::Integer(v as i128))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
        Ok(RecordValue::Integer(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        i128::try_from(v)
            .map(RecordValue::Integer)
            .map_err(|_| E::custom(format!("integer out of range: {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(RecordValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(RecordValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(RecordValue::String(v))
    }
}

impl<'de> Deserialize<'de> for RecordValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RecordValueVisitor)
    }
}

/// Column name to value, in column order.
pub type Record = IndexMap<String, RecordValue>;

/// Announces the schema and keys of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaMessage {
    pub stream: String,
    pub schema: Schema,
    pub key_properties: Vec<String>,
    /// Omitted from the output when absent or empty
    #[serde(default, skip_serializing_if = "is_none_or_empty")]
    pub bookmark_properties: Option<Vec<String>>,
}

/// One row of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMessage {
    pub stream: String,
    pub record: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_time_extracted"
    )]
    pub time_extracted: Option<DateTime<Utc>>,
}

/// Marks a table version as complete so targets can drop older versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivateVersionMessage {
    pub stream: String,
    pub version: i64,
}

/// Opaque bookmark state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub value: serde_json::Value,
}

/// Any message written to the output stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    Schema(SchemaMessage),
    Record(RecordMessage),
    ActivateVersion(ActivateVersionMessage),
    State(StateMessage),
}

impl From<SchemaMessage> for Message {
    fn from(m: SchemaMessage) -> Self {
        Self::Schema(m)
    }
}

impl From<RecordMessage> for Message {
    fn from(m: RecordMessage) -> Self {
        Self::Record(m)
    }
}

impl From<ActivateVersionMessage> for Message {
    fn from(m: ActivateVersionMessage) -> Self {
        Self::ActivateVersion(m)
    }
}

impl From<StateMessage> for Message {
    fn from(m: StateMessage) -> Self {
        Self::State(m)
    }
}

fn is_none_or_empty(value: &Option<Vec<String>>) -> bool {
    value.as_ref().map_or(true, Vec::is_empty)
}

// Microsecond precision with a literal `Z`, e.g. 2024-01-01T00:00:00.000000Z
fn serialize_time_extracted<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Micros, true)),
        None => serializer.serialize_none(),
    }
}
