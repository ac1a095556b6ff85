//! Schema and record message construction.
//!
//! The sync strategies (full table, incremental) drive a row cursor and use
//! this module to decide which columns to select, to announce the stream's
//! schema and to turn each fetched row into a RECORD message:
//!
//! ```text
//! catalog stream ──► selected_columns ──► SELECT ... ──► rows
//!        │                                                │
//!        └──► send_schema_message        RowConverter ◄───┘
//!                     │                       │
//!                     ▼                       ▼
//!                 MessageSink ◄──────── RecordMessage
//! ```

use chrono::{DateTime, Utc};
use oracle_types::{prepare_columns_sql, Coercion, CoercionError, OracleValue, SqlFragmentError};
use singer_types::{
    should_sync_field, CatalogEntry, Message, MessageSink, MetadataMap, Record, RecordMessage,
    SchemaMessage, SinkError,
};
use tracing::debug;

/// Errors raised while building or emitting messages.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Column '{column}' not found in schema of stream '{stream}'")]
    ColumnNotFound { stream: String, column: String },

    #[error("Row has {actual} values but {expected} columns were selected")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("Failed to coerce column '{column}': {source}")]
    Coercion {
        column: String,
        #[source]
        source: CoercionError,
    },

    #[error(transparent)]
    Sql(#[from] SqlFragmentError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Whether a column should be synced, given the stream's metadata.
///
/// Columns without metadata are synced.
pub fn should_sync_column(metadata: &MetadataMap, field_name: &str) -> bool {
    match metadata.field(field_name) {
        Some(field) => field.should_sync(true),
        None => should_sync_field(None, None, true),
    }
}

/// Columns to select for a stream, in schema order.
pub fn selected_columns(stream: &CatalogEntry) -> Vec<String> {
    stream
        .schema
        .properties
        .iter()
        .flat_map(|p| p.keys())
        .filter(|column| should_sync_column(&stream.metadata, column))
        .cloned()
        .collect()
}

/// SELECT-list expressions for `columns`, see [`prepare_columns_sql`].
pub fn escaped_columns(stream: &CatalogEntry, columns: &[String]) -> Result<Vec<String>, SyncError> {
    columns
        .iter()
        .map(|c| prepare_columns_sql(stream, c).map_err(SyncError::from))
        .collect()
}

/// Key properties announced for a stream.
///
/// Views have no primary key, so the user supplies `view-key-properties`;
/// an absent or empty list means the view has no key. A table without
/// `table-key-properties` is likewise announced with `[]`, never `null`.
pub fn key_properties(stream: &CatalogEntry) -> Vec<String> {
    let md = stream.metadata.stream();
    let keys = if md.is_view() {
        md.view_key_properties.as_ref()
    } else {
        md.table_key_properties.as_ref()
    };
    keys.cloned().unwrap_or_default()
}

/// Write the SCHEMA message for `stream`.
///
/// An empty `bookmark_properties` list is left out of the message, the same
/// as `None`.
pub fn send_schema_message<S: MessageSink>(
    stream: &CatalogEntry,
    bookmark_properties: Option<Vec<String>>,
    sink: &mut S,
) -> Result<(), SyncError> {
    let key_properties = key_properties(stream);
    debug!(
        "Schema for {}: key properties {:?}, bookmark properties {:?}",
        stream.tap_stream_id, key_properties, bookmark_properties
    );

    let message = Message::Schema(SchemaMessage {
        stream: stream.tap_stream_id.clone(),
        schema: stream.schema.clone(),
        key_properties,
        bookmark_properties,
    });
    sink.write_message(&message)?;
    Ok(())
}

/// Build (but do not emit) the RECORD message for one row.
///
/// `columns` names the row's values in order. For many rows of the same
/// stream, build a [`RowConverter`] once instead.
pub fn row_to_singer_message(
    stream: &CatalogEntry,
    row: Vec<OracleValue>,
    version: Option<i64>,
    columns: &[String],
    time_extracted: DateTime<Utc>,
) -> Result<RecordMessage, SyncError> {
    RowConverter::new(stream, columns)?.convert(row, version, time_extracted)
}

/// Row → RECORD conversion with the per-column coercions resolved up front.
#[derive(Debug, Clone)]
pub struct RowConverter<'a> {
    stream_id: &'a str,
    columns: &'a [String],
    coercions: Vec<Coercion>,
}

impl<'a> RowConverter<'a> {
    /// Resolve the coercion of every column.
    ///
    /// Fails if a column has no property in the stream's schema.
    pub fn new(stream: &'a CatalogEntry, columns: &'a [String]) -> Result<Self, SyncError> {
        let coercions = columns
            .iter()
            .map(|column| {
                stream
                    .property(column)
                    .map(Coercion::for_property)
                    .ok_or_else(|| SyncError::ColumnNotFound {
                        stream: stream.tap_stream_id.clone(),
                        column: column.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Coercions for {}: {:?}",
            stream.tap_stream_id,
            columns.iter().zip(&coercions).collect::<Vec<_>>()
        );

        Ok(Self {
            stream_id: &stream.tap_stream_id,
            columns,
            coercions,
        })
    }

    pub fn columns(&self) -> &[String] {
        self.columns
    }

    pub fn coercions(&self) -> &[Coercion] {
        &self.coercions
    }

    /// Coerce a row and wrap it in a RECORD message.
    pub fn convert(
        &self,
        row: Vec<OracleValue>,
        version: Option<i64>,
        time_extracted: DateTime<Utc>,
    ) -> Result<RecordMessage, SyncError> {
        if row.len() != self.columns.len() {
            return Err(SyncError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }

        let mut record = Record::with_capacity(row.len());
        for ((column, coercion), value) in self.columns.iter().zip(&self.coercions).zip(row) {
            let value = coercion.apply(value).map_err(|source| SyncError::Coercion {
                column: column.clone(),
                source,
            })?;
            record.insert(column.clone(), value);
        }

        Ok(RecordMessage {
            stream: self.stream_id.to_string(),
            record,
            version,
            time_extracted: Some(time_extracted),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use singer_types::{FieldMetadata, Inclusion, Schema, StreamMetadata};

    fn field(inclusion: Option<Inclusion>, selected: Option<bool>) -> FieldMetadata {
        FieldMetadata {
            inclusion,
            selected,
            ..Default::default()
        }
    }

    #[test]
    fn test_should_sync_column() {
        let md = MetadataMap::default()
            .with_field("ID", field(Some(Inclusion::Automatic), Some(false)))
            .with_field("SECRET", field(Some(Inclusion::Unsupported), Some(true)))
            .with_field("NAME", field(Some(Inclusion::Available), None))
            .with_field("NOTES", field(Some(Inclusion::Available), Some(false)));

        assert!(should_sync_column(&md, "ID"));
        assert!(!should_sync_column(&md, "SECRET"));
        assert!(should_sync_column(&md, "NAME"));
        assert!(!should_sync_column(&md, "NOTES"));
        // no metadata at all
        assert!(should_sync_column(&md, "UNKNOWN"));
    }

    #[test]
    fn test_selected_columns_follow_schema_order() {
        let stream = CatalogEntry::new(
            "S",
            Schema::object([
                ("B", Schema::of_type("string")),
                ("A", Schema::of_type("string")),
                ("C", Schema::of_type("string")),
            ]),
            MetadataMap::default().with_field("A", field(Some(Inclusion::Unsupported), None)),
        );
        assert_eq!(selected_columns(&stream), vec!["B", "C"]);
    }

    #[test]
    fn test_key_properties() {
        let mut stream = CatalogEntry::new(
            "S",
            Schema::default(),
            MetadataMap::new(StreamMetadata {
                table_key_properties: Some(vec!["ID".to_string()]),
                view_key_properties: Some(vec!["VID".to_string()]),
                ..Default::default()
            }),
        );
        assert_eq!(key_properties(&stream), vec!["ID"]);

        stream.metadata.stream_mut().is_view = Some(true);
        assert_eq!(key_properties(&stream), vec!["VID"]);

        stream.metadata.stream_mut().view_key_properties = None;
        assert!(key_properties(&stream).is_empty());
    }

    #[test]
    fn test_converter_rejects_short_rows() {
        let stream = CatalogEntry::new(
            "S",
            Schema::object([("A", Schema::of_type("string"))]),
            MetadataMap::default(),
        );
        let columns = vec!["A".to_string()];
        let converter = RowConverter::new(&stream, &columns).unwrap();
        let err = converter.convert(vec![], None, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::ColumnCountMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }
}
