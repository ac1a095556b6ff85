//! Singer catalog: the list of streams a tap can sync.

use crate::metadata::MetadataMap;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error type for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Error reading catalog file
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing catalog JSON
    #[error("Failed to parse catalog: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Stream not found in catalog
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
}

/// One stream of the catalog (a table or view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique stream identifier, e.g. `ORCL-ROOT-CHICKEN`
    pub tap_stream_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    pub schema: Schema,

    #[serde(default)]
    pub metadata: MetadataMap,
}

impl CatalogEntry {
    pub fn new(tap_stream_id: impl Into<String>, schema: Schema, metadata: MetadataMap) -> Self {
        Self {
            tap_stream_id: tap_stream_id.into(),
            stream: None,
            table_name: None,
            schema,
            metadata,
        }
    }

    /// Schema of a top-level column.
    pub fn property(&self, column: &str) -> Option<&Schema> {
        self.schema.property(column)
    }

    /// Whether the stream itself is selected for sync.
    pub fn is_selected(&self) -> bool {
        self.metadata.stream().selected.unwrap_or(false)
    }
}

/// A full catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a catalog from a JSON string.
    pub fn parse(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Find a stream by its `tap_stream_id`.
    pub fn get_stream(&self, tap_stream_id: &str) -> Result<&CatalogEntry, CatalogError> {
        self.streams
            .iter()
            .find(|s| s.tap_stream_id == tap_stream_id)
            .ok_or_else(|| CatalogError::StreamNotFound(tap_stream_id.to_string()))
    }

    /// Streams whose table-level metadata marks them selected.
    pub fn selected_streams(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.streams.iter().filter(|s| s.is_selected())
    }
}
