//! JSON Schema subset used by Singer streams.
//!
//! Only the keywords that drive conversion (`type`, `format`, `description`,
//! `properties`) are typed. Everything else (`maxLength`, `multipleOf`,
//! `anyOf`, ...) is carried through untouched in [`Schema::extra`] so that the
//! SCHEMA message repeats the catalog's schema verbatim.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `format` marker for exact decimals carried as strings.
pub const DECIMAL_FORMAT: &str = "singer.decimal";

/// `format` marker for date/time strings.
pub const DATE_TIME_FORMAT: &str = "date-time";

/// The `type` keyword: either a single type name or a list of them.
///
/// ```json
/// "type": "string"
/// "type": ["null", "string"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonType {
    Single(String),
    Multiple(Vec<String>),
}

impl JsonType {
    /// Whether `name` is one of the declared types.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            Self::Single(t) => t == name,
            Self::Multiple(ts) => ts.iter().any(|t| t == name),
        }
    }
}

impl From<&str> for JsonType {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<Vec<&str>> for JsonType {
    fn from(names: Vec<&str>) -> Self {
        Self::Multiple(names.into_iter().map(str::to_string).collect())
    }
}

/// A (possibly nested) JSON Schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub json_type: Option<JsonType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object properties, in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,

    /// Keywords this crate does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Schema {
    /// Schema node with just a `type`.
    pub fn of_type(json_type: impl Into<JsonType>) -> Self {
        Self {
            json_type: Some(json_type.into()),
            ..Self::default()
        }
    }

    /// Builder-style setter for `format`.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Builder-style setter for `description`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Object schema with the given properties.
    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Self {
            json_type: Some(JsonType::from("object")),
            properties: Some(properties.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            ..Self::default()
        }
    }

    /// Whether the declared `type` includes `name`.
    ///
    /// A node without a `type` keyword includes nothing.
    pub fn includes_type(&self, name: &str) -> bool {
        self.json_type.as_ref().is_some_and(|t| t.includes(name))
    }

    /// Whether the declared `format` equals `format`.
    pub fn has_format(&self, format: &str) -> bool {
        self.format.as_deref() == Some(format)
    }

    /// Look up a top-level property by name.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.as_ref().and_then(|p| p.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_accepts_string_and_list() {
        let single: Schema = serde_json::from_str(r#"{"type": "integer"}"#).unwrap();
        assert!(single.includes_type("integer"));
        assert!(!single.includes_type("null"));

        let multiple: Schema = serde_json::from_str(r#"{"type": ["null", "string"]}"#).unwrap();
        assert!(multiple.includes_type("string"));
        assert!(multiple.includes_type("null"));
        assert!(!multiple.includes_type("integer"));
    }

    #[test]
    fn test_unknown_keywords_round_trip() {
        let json = serde_json::json!({
            "type": "object",
            "properties": {
                "ID": {"type": ["null", "integer"], "maximum": 99999, "minimum": -99999},
                "NAME": {"type": ["null", "string"], "maxLength": 255}
            }
        });
        let schema: Schema = serde_json::from_value(json.clone()).unwrap();

        let id = schema.property("ID").unwrap();
        assert_eq!(id.extra.get("maximum"), Some(&serde_json::json!(99999)));
        assert_eq!(serde_json::to_value(&schema).unwrap(), json);
    }

    #[test]
    fn test_properties_keep_document_order() {
        let schema: Schema = serde_json::from_str(
            r#"{"type": "object", "properties": {"Z": {}, "M": {}, "A": {}}}"#,
        )
        .unwrap();
        let names: Vec<&str> = schema
            .properties
            .iter()
            .flat_map(|p| p.keys())
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["Z", "M", "A"]);
        assert_eq!(
            serde_json::to_string(&schema).unwrap(),
            r#"{"type":"object","properties":{"Z":{},"M":{},"A":{}}}"#
        );
    }

    #[test]
    fn test_builders() {
        let schema = Schema::object([
            (
                "PRICE",
                Schema::of_type(vec!["null", "string"]).with_format(DECIMAL_FORMAT),
            ),
            ("IMAGE", Schema::of_type("string").with_description("blob")),
        ]);

        assert!(schema.property("PRICE").unwrap().has_format(DECIMAL_FORMAT));
        assert_eq!(
            schema.property("IMAGE").unwrap().description.as_deref(),
            Some("blob")
        );
        assert!(schema.property("MISSING").is_none());
    }
}
