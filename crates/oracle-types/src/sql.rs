//! Oracle SQL fragments for column lists and replication-key bounds.
//!
//! Boundary values are interpolated as written. They are not escaped, so
//! they must come from trusted state (the tap's own bookmarks).

use regex::Regex;
use singer_types::{CatalogEntry, DATE_TIME_FORMAT};
use std::fmt::Display;
use std::sync::LazyLock;

static TIMESTAMP_TZ_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TIMESTAMP\([0-9]\) WITH (LOCAL )?TIME ZONE").unwrap());

static TIMESTAMP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TIMESTAMP\([0-9]\)").unwrap());

/// Errors raised while building SQL fragments.
#[derive(Debug, thiserror::Error)]
pub enum SqlFragmentError {
    #[error("Column '{column}' not found in schema of stream '{stream}'")]
    ColumnNotFound { stream: String, column: String },
}

/// Quote a column identifier: ` "NAME" `.
pub fn escape_column(column: &str) -> String {
    format!(" \"{column}\" ")
}

/// Column expression for the SELECT list.
///
/// Date/time columns are selected through `to_char` so that the driver hands
/// back text that compares and bookmarks stably.
pub fn prepare_columns_sql(stream: &CatalogEntry, column: &str) -> Result<String, SqlFragmentError> {
    let property = stream
        .property(column)
        .ok_or_else(|| SqlFragmentError::ColumnNotFound {
            stream: stream.tap_stream_id.clone(),
            column: column.to_string(),
        })?;

    let escaped = escape_column(column);
    if property.includes_type("string") && property.has_format(DATE_TIME_FORMAT) {
        Ok(format!("to_char({escaped})"))
    } else {
        Ok(escaped)
    }
}

/// How a boundary value is written as a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `42`
    Number,
    /// `to_date('...')`
    Date,
    /// `to_timestamp_tz('...')`
    TimestampTz,
    /// `to_timestamp('...')`
    Timestamp,
    /// `'...'`
    Text,
}

impl LiteralKind {
    /// Classify a native column type such as `NUMBER` or
    /// `TIMESTAMP(6) WITH LOCAL TIME ZONE`.
    pub fn for_sql_datatype(sql_datatype: &str) -> Self {
        if sql_datatype == "NUMBER" {
            Self::Number
        } else if sql_datatype == "DATE" {
            Self::Date
        } else if TIMESTAMP_TZ_REGEX.is_match(sql_datatype) {
            Self::TimestampTz
        } else if TIMESTAMP_REGEX.is_match(sql_datatype) {
            Self::Timestamp
        } else {
            Self::Text
        }
    }

    pub fn render(self, value: impl Display) -> String {
        match self {
            Self::Number => value.to_string(),
            Self::Date => format!("to_date('{value}')"),
            Self::TimestampTz => format!("to_timestamp_tz('{value}')"),
            Self::Timestamp => format!("to_timestamp('{value}')"),
            Self::Text => format!("'{value}'"),
        }
    }
}

/// Literal for a replication-key bound in a WHERE clause.
pub fn prepare_where_clause_arg(value: impl Display, sql_datatype: &str) -> String {
    LiteralKind::for_sql_datatype(sql_datatype).render(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use singer_types::{MetadataMap, Schema};

    fn stream() -> CatalogEntry {
        CatalogEntry::new(
            "ORCL-ROOT-CHICKEN",
            Schema::object([
                ("ID", Schema::of_type("integer")),
                (
                    "UPDATED_AT",
                    Schema::of_type(vec!["null", "string"]).with_format("date-time"),
                ),
                ("BORN_ON", Schema::of_type("date").with_format("date-time")),
            ]),
            MetadataMap::default(),
        )
    }

    #[test]
    fn test_prepare_columns_sql() {
        let stream = stream();
        assert_eq!(prepare_columns_sql(&stream, "ID").unwrap(), " \"ID\" ");
        assert_eq!(
            prepare_columns_sql(&stream, "UPDATED_AT").unwrap(),
            "to_char( \"UPDATED_AT\" )"
        );
        // date-time format alone is not enough
        assert_eq!(prepare_columns_sql(&stream, "BORN_ON").unwrap(), " \"BORN_ON\" ");
    }

    #[test]
    fn test_prepare_columns_sql_missing_column() {
        let err = prepare_columns_sql(&stream(), "NOPE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Column 'NOPE' not found in schema of stream 'ORCL-ROOT-CHICKEN'"
        );
    }

    #[test]
    fn test_where_clause_literals() {
        assert_eq!(prepare_where_clause_arg(42, "NUMBER"), "42");
        assert_eq!(prepare_where_clause_arg("42.5", "NUMBER"), "42.5");
        assert_eq!(
            prepare_where_clause_arg("2020-01-01", "DATE"),
            "to_date('2020-01-01')"
        );
        assert_eq!(
            prepare_where_clause_arg("2020-01-01 00:00:00 +00:00", "TIMESTAMP(6) WITH TIME ZONE"),
            "to_timestamp_tz('2020-01-01 00:00:00 +00:00')"
        );
        assert_eq!(
            prepare_where_clause_arg("2020-01-01", "TIMESTAMP(9) WITH LOCAL TIME ZONE"),
            "to_timestamp_tz('2020-01-01')"
        );
        assert_eq!(
            prepare_where_clause_arg("2020-01-01", "TIMESTAMP(6)"),
            "to_timestamp('2020-01-01')"
        );
        assert_eq!(prepare_where_clause_arg("x", "VARCHAR2"), "'x'");
        assert_eq!(prepare_where_clause_arg("x", "number"), "'x'");
    }

    #[test]
    fn test_where_clause_value_is_not_escaped() {
        assert_eq!(prepare_where_clause_arg("O'Brien", "VARCHAR2"), "'O'Brien'");
    }

    #[test]
    fn test_literal_kind_classification() {
        use LiteralKind::*;
        for (datatype, kind) in [
            ("NUMBER", Number),
            ("DATE", Date),
            ("TIMESTAMP(3) WITH TIME ZONE", TimestampTz),
            ("TIMESTAMP(3) WITH LOCAL TIME ZONE", TimestampTz),
            ("TIMESTAMP(0)", Timestamp),
            ("TIMESTAMP", Text),
            ("NVARCHAR2", Text),
        ] {
            assert_eq!(LiteralKind::for_sql_datatype(datatype), kind, "{datatype}");
        }
    }
}
