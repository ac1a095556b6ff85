//! Custom query templates.
//!
//! Users can replace the generated SELECT for a stream with their own SQL in
//! `custom_queries/<file>`. The file may reference any of these placeholders:
//!
//! | placeholder               | value                                             |
//! |---------------------------|---------------------------------------------------|
//! | `{escaped_columns}`       | SELECT-list expressions joined with `,`           |
//! | `{escaped_schema}`        | quoted schema name                                |
//! | `{escaped_table}`         | quoted table name                                 |
//! | `{replication_key_value}` | WHERE-clause literal of the bookmark, or `NULL`   |
//!
//! Only placeholders that occur in the file are substituted. Literal braces
//! are written `{{` and `}}`; any other placeholder is an error.

use oracle_types::prepare_where_clause_arg;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory, relative to the working directory, holding query files.
pub const DEFAULT_CUSTOM_QUERIES_DIR: &str = "custom_queries";

/// Placeholders a query file may use.
pub const QUERY_KEYS: [&str; 4] = [
    "escaped_columns",
    "escaped_schema",
    "escaped_table",
    "replication_key_value",
];

/// Errors in a query template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("Unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),

    #[error("Single '}}' at byte {0}")]
    UnmatchedClose(usize),

    #[error("No substitution for placeholder '{0}'")]
    MissingKey(String),

    #[error("Positional placeholder '{{}}' is not supported")]
    Positional,

    #[error("Conversion or format spec not supported in placeholder '{0}'")]
    UnsupportedSpec(String),
}

/// Errors raised by [`format_query_file`].
#[derive(Debug, thiserror::Error)]
pub enum QueryFileError {
    #[error("Custom query file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read custom query file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to format custom query: {0}")]
    Format(#[from] TemplateError),
}

#[derive(Debug, Clone, PartialEq)]
struct Placeholder {
    name: String,
    /// Everything after the name, e.g. `:>10` or `!r`
    spec: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A parsed query template.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTemplate {
    segments: Vec<Segment>,
}

impl QueryTemplate {
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, n)| n == '{').is_some() => literal.push('{'),
                '}' if chars.next_if(|&(_, n)| n == '}').is_some() => literal.push('}'),
                '}' => return Err(TemplateError::UnmatchedClose(pos)),
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, '{')) | None => return Err(TemplateError::UnclosedBrace(pos)),
                            Some((_, ch)) => field.push(ch),
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let placeholder = match field.find(['!', ':']) {
                        Some(split) => Placeholder {
                            name: field[..split].to_string(),
                            spec: Some(field[split..].to_string()),
                        },
                        None => Placeholder {
                            name: field,
                            spec: None,
                        },
                    };
                    segments.push(Segment::Placeholder(placeholder));
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Names of the named placeholders in the template.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) if !p.name.is_empty() => Some(p.name.as_str()),
            _ => None,
        })
    }

    /// Substitute every placeholder from `values`.
    pub fn render(&self, values: &BTreeMap<&str, String>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(p) if p.name.is_empty() => {
                    return Err(TemplateError::Positional);
                }
                Segment::Placeholder(p) => {
                    let value = values
                        .get(p.name.as_str())
                        .ok_or_else(|| TemplateError::MissingKey(p.name.clone()))?;
                    if p.spec.is_some() {
                        return Err(TemplateError::UnsupportedSpec(p.name.clone()));
                    }
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Loads and formats query files from one directory.
#[derive(Debug, Clone)]
pub struct QueryRenderer {
    dir: PathBuf,
}

impl Default for QueryRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CUSTOM_QUERIES_DIR)
    }
}

impl QueryRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a query file from the directory.
    pub fn load(&self, query_file: &str) -> Result<String, QueryFileError> {
        let path = self.dir.join(query_file);
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => QueryFileError::NotFound { path },
            _ => QueryFileError::Io { path, source },
        })
    }

    /// Load `query_file` and substitute the placeholders it uses.
    ///
    /// `replication_key_value` is rendered as a literal for
    /// `replication_key_datatype`; when absent or empty it becomes `NULL`.
    pub fn format_query_file(
        &self,
        query_file: &str,
        escaped_columns: &[String],
        escaped_schema: &str,
        escaped_table: &str,
        replication_key_value: Option<&str>,
        replication_key_datatype: Option<&str>,
    ) -> Result<String, QueryFileError> {
        let query = self.load(query_file)?;
        let template = QueryTemplate::parse(&query)?;

        let replication_key_literal = match replication_key_value {
            Some(value) if !value.is_empty() => {
                prepare_where_clause_arg(value, replication_key_datatype.unwrap_or_default())
            }
            _ => "NULL".to_string(),
        };
        let inputs: [(&str, String); 4] = [
            ("escaped_columns", escaped_columns.join(",")),
            ("escaped_schema", escaped_schema.to_string()),
            ("escaped_table", escaped_table.to_string()),
            ("replication_key_value", replication_key_literal),
        ];

        let wanted: Vec<&str> = template.placeholders().collect();
        let substitutions: BTreeMap<&str, String> = inputs
            .into_iter()
            .filter(|(key, _)| wanted.contains(key))
            .collect();

        info!("Custom query {query_file} substitutions: {substitutions:?}");
        Ok(template.render(&substitutions)?)
    }
}

/// [`QueryRenderer::format_query_file`] against `custom_queries/`.
pub fn format_query_file(
    query_file: &str,
    escaped_columns: &[String],
    escaped_schema: &str,
    escaped_table: &str,
    replication_key_value: Option<&str>,
    replication_key_datatype: Option<&str>,
) -> Result<String, QueryFileError> {
    QueryRenderer::default().format_query_file(
        query_file,
        escaped_columns,
        escaped_schema,
        escaped_table,
        replication_key_value,
        replication_key_datatype,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_parse_and_render() {
        let template = QueryTemplate::parse("SELECT {a} FROM {b} WHERE x = '{{literal}}'").unwrap();
        let names: Vec<&str> = template.placeholders().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            template.render(&values(&[("a", "1"), ("b", "T")])).unwrap(),
            "SELECT 1 FROM T WHERE x = '{literal}'"
        );
    }

    #[test]
    fn test_missing_substitution() {
        let template = QueryTemplate::parse("SELECT {a}, {unknown}").unwrap();
        assert_eq!(
            template.render(&values(&[("a", "1")])).unwrap_err(),
            TemplateError::MissingKey("unknown".to_string())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            QueryTemplate::parse("SELECT {a").unwrap_err(),
            TemplateError::UnclosedBrace(7)
        );
        assert_eq!(
            QueryTemplate::parse("SELECT a}").unwrap_err(),
            TemplateError::UnmatchedClose(8)
        );
        assert_eq!(
            QueryTemplate::parse("{a{b}}").unwrap_err(),
            TemplateError::UnclosedBrace(0)
        );
    }

    #[test]
    fn test_positional_and_spec_placeholders() {
        let positional = QueryTemplate::parse("SELECT {}").unwrap();
        assert_eq!(positional.placeholders().count(), 0);
        assert_eq!(
            positional.render(&BTreeMap::new()).unwrap_err(),
            TemplateError::Positional
        );

        let spec = QueryTemplate::parse("SELECT {a:>10}").unwrap();
        assert_eq!(spec.placeholders().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(
            spec.render(&values(&[("a", "1")])).unwrap_err(),
            TemplateError::UnsupportedSpec("a".to_string())
        );
    }
}
