//! Stream and field metadata.
//!
//! In a catalog, metadata is a list of entries addressed by a "breadcrumb"
//! path:
//!
//! ```json
//! "metadata": [
//!   {"breadcrumb": [], "metadata": {"is-view": false, "table-key-properties": ["ID"]}},
//!   {"breadcrumb": ["properties", "NAME"], "metadata": {"inclusion": "available", "selected": true}}
//! ]
//! ```
//!
//! [`MetadataMap`] replaces the path lookup with a [`Breadcrumb`] enum and
//! typed records for the two levels that exist for relational streams.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Errors raised while reading metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A breadcrumb path that is neither `[]` nor `["properties", name]`
    #[error("Unsupported metadata breadcrumb: {0:?}")]
    UnsupportedBreadcrumb(Vec<String>),

    /// Entry metadata did not match the expected shape
    #[error("Invalid metadata for breadcrumb {breadcrumb:?}: {source}")]
    InvalidEntry {
        breadcrumb: Vec<String>,
        #[source]
        source: serde_json::Error,
    },
}

/// Address of a metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum Breadcrumb {
    /// Table-level metadata, `[]`
    Stream,
    /// Field-level metadata, `["properties", name]`
    Property(String),
}

impl TryFrom<Vec<String>> for Breadcrumb {
    type Error = MetadataError;

    fn try_from(path: Vec<String>) -> Result<Self, Self::Error> {
        match path.as_slice() {
            [] => Ok(Self::Stream),
            [scope, name] if scope == "properties" => Ok(Self::Property(name.clone())),
            _ => Err(MetadataError::UnsupportedBreadcrumb(path)),
        }
    }
}

impl From<Breadcrumb> for Vec<String> {
    fn from(breadcrumb: Breadcrumb) -> Self {
        match breadcrumb {
            Breadcrumb::Stream => Vec::new(),
            Breadcrumb::Property(name) => vec!["properties".to_string(), name],
        }
    }
}

/// Availability constraint on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inclusion {
    /// Synced only when selected (or selected by default)
    Available,
    /// Always synced, e.g. key and replication-key columns
    Automatic,
    /// Never synced, e.g. column types the tap cannot read
    Unsupported,
}

/// Singer field selection policy.
///
/// - `automatic` fields are always synced;
/// - `unsupported` fields are never synced;
/// - otherwise an explicit `selected` wins, falling back to `default`.
pub fn should_sync_field(inclusion: Option<Inclusion>, selected: Option<bool>, default: bool) -> bool {
    match inclusion {
        Some(Inclusion::Automatic) => true,
        Some(Inclusion::Unsupported) => false,
        Some(Inclusion::Available) | None => selected.unwrap_or(default),
    }
}

/// Field-level metadata (`["properties", name]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<Inclusion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_by_default: Option<bool>,

    /// Native column type, e.g. `NUMBER` or `TIMESTAMP(6) WITH TIME ZONE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_datatype: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FieldMetadata {
    /// Apply [`should_sync_field`] to this field.
    pub fn should_sync(&self, default: bool) -> bool {
        should_sync_field(self.inclusion, self.selected, default)
    }
}

/// Table-level metadata (`[]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StreamMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_view: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_key_properties: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_key_properties: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StreamMetadata {
    pub fn is_view(&self) -> bool {
        self.is_view.unwrap_or(false)
    }
}

/// Wire form of a single metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Breadcrumb,
    pub metadata: serde_json::Value,
}

/// All metadata of one stream, keyed by [`Breadcrumb`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MetadataEntry>", into = "Vec<MetadataEntry>")]
pub struct MetadataMap {
    stream: StreamMetadata,
    fields: IndexMap<String, FieldMetadata>,
}

impl MetadataMap {
    pub fn new(stream: StreamMetadata) -> Self {
        Self {
            stream,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, metadata: FieldMetadata) -> Self {
        self.fields.insert(name.into(), metadata);
        self
    }

    pub fn stream(&self) -> &StreamMetadata {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut StreamMetadata {
        &mut self.stream
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, metadata: FieldMetadata) {
        self.fields.insert(name.into(), metadata);
    }

    /// Iterate over field metadata in catalog order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldMetadata)> {
        self.fields.iter().map(|(name, md)| (name.as_str(), md))
    }

    /// Look up the entry for an arbitrary breadcrumb.
    pub fn get(&self, breadcrumb: &Breadcrumb) -> MetadataRef<'_> {
        match breadcrumb {
            Breadcrumb::Stream => MetadataRef::Stream(&self.stream),
            Breadcrumb::Property(name) => MetadataRef::Field(self.fields.get(name)),
        }
    }
}

/// Result of [`MetadataMap::get`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetadataRef<'a> {
    Stream(&'a StreamMetadata),
    Field(Option<&'a FieldMetadata>),
}

impl TryFrom<Vec<MetadataEntry>> for MetadataMap {
    type Error = MetadataError;

    fn try_from(entries: Vec<MetadataEntry>) -> Result<Self, Self::Error> {
        let mut map = MetadataMap::default();
        // Later entries win, matching a path-keyed dictionary.
        for entry in entries {
            let invalid = |source| MetadataError::InvalidEntry {
                breadcrumb: entry.breadcrumb.clone().into(),
                source,
            };
            match &entry.breadcrumb {
                Breadcrumb::Stream => {
                    map.stream = serde_json::from_value(entry.metadata.clone()).map_err(invalid)?;
                }
                Breadcrumb::Property(name) => {
                    let field = serde_json::from_value(entry.metadata.clone()).map_err(invalid)?;
                    map.fields.insert(name.clone(), field);
                }
            }
        }
        Ok(map)
    }
}

impl From<MetadataMap> for Vec<MetadataEntry> {
    fn from(map: MetadataMap) -> Self {
        let mut entries = Vec::with_capacity(map.fields.len() + 1);
        entries.push(MetadataEntry {
            breadcrumb: Breadcrumb::Stream,
            metadata: serde_json::to_value(map.stream).unwrap_or_default(),
        });
        for (name, field) in map.fields {
            entries.push(MetadataEntry {
                breadcrumb: Breadcrumb::Property(name),
                metadata: serde_json::to_value(field).unwrap_or_default(),
            });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_policy() {
        use Inclusion::*;

        for selected in [None, Some(true), Some(false)] {
            assert!(should_sync_field(Some(Automatic), selected, false));
            assert!(!should_sync_field(Some(Unsupported), selected, true));
        }

        assert!(should_sync_field(Some(Available), Some(true), false));
        assert!(!should_sync_field(Some(Available), Some(false), true));
        assert!(should_sync_field(Some(Available), None, true));
        assert!(!should_sync_field(Some(Available), None, false));
        assert!(should_sync_field(None, None, true));
        assert!(!should_sync_field(None, Some(false), true));
    }

    #[test]
    fn test_breadcrumb_paths() {
        assert_eq!(Breadcrumb::try_from(vec![]).unwrap(), Breadcrumb::Stream);
        assert_eq!(
            Breadcrumb::try_from(vec!["properties".to_string(), "ID".to_string()]).unwrap(),
            Breadcrumb::Property("ID".to_string())
        );
        assert!(Breadcrumb::try_from(vec!["items".to_string()]).is_err());
    }

    #[test]
    fn test_metadata_map_from_catalog_entries() {
        let json = serde_json::json!([
            {"breadcrumb": [], "metadata": {
                "is-view": false,
                "table-key-properties": ["ID"],
                "schema-name": "ROOT",
                "database-name": "ORCL",
                "row-count": 42
            }},
            {"breadcrumb": ["properties", "ID"], "metadata": {
                "inclusion": "automatic",
                "sql-datatype": "NUMBER",
                "selected-by-default": true
            }},
            {"breadcrumb": ["properties", "NAME"], "metadata": {
                "inclusion": "available",
                "selected": false,
                "sql-datatype": "VARCHAR2"
            }}
        ]);

        let map: MetadataMap = serde_json::from_value(json.clone()).unwrap();
        assert!(!map.stream().is_view());
        assert_eq!(
            map.stream().table_key_properties,
            Some(vec!["ID".to_string()])
        );
        assert_eq!(map.stream().row_count, Some(42));

        let id = map.field("ID").unwrap();
        assert_eq!(id.inclusion, Some(Inclusion::Automatic));
        assert_eq!(id.sql_datatype.as_deref(), Some("NUMBER"));
        assert!(id.should_sync(true));
        assert!(!map.field("NAME").unwrap().should_sync(true));
        assert!(map.field("MISSING").is_none());

        assert_eq!(serde_json::to_value(&map).unwrap(), json);
    }

    #[test]
    fn test_unknown_inclusion_is_rejected() {
        let json = serde_json::json!([
            {"breadcrumb": ["properties", "ID"], "metadata": {"inclusion": "sometimes"}}
        ]);
        let err = serde_json::from_value::<MetadataMap>(json).unwrap_err();
        assert!(err.to_string().contains("properties"));
    }

    #[test]
    fn test_get_by_breadcrumb() {
        let map = MetadataMap::new(StreamMetadata {
            is_view: Some(true),
            ..Default::default()
        })
        .with_field("ID", FieldMetadata::default());

        assert!(matches!(
            map.get(&Breadcrumb::Stream),
            MetadataRef::Stream(s) if s.is_view()
        ));
        assert!(matches!(
            map.get(&Breadcrumb::Property("ID".into())),
            MetadataRef::Field(Some(_))
        ));
        assert!(matches!(
            map.get(&Breadcrumb::Property("X".into())),
            MetadataRef::Field(None)
        ));
    }
}
