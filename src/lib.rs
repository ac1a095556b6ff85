//! tap-oracle conversion layer
//!
//! The pieces the Oracle sync strategies share: which columns to select,
//! SCHEMA and RECORD message construction, and custom query rendering.
//! Value coercion and SQL literals live in `oracle_types`; the Singer data
//! model lives in `singer_types`.
//!
//! # CLI Usage
//!
//! ```bash
//! # Render custom_queries/chicken.sql for a catalog stream
//! tap-oracle render-query chicken.sql --catalog catalog.json --stream ORCL-ROOT-CHICKEN
//!
//! # Print the SCHEMA message of a stream
//! tap-oracle schema --catalog catalog.json --stream ORCL-ROOT-CHICKEN --bookmark-property UPDATED_AT
//! ```

use clap::Parser;
use std::path::PathBuf;

pub mod query;
pub mod sync;

pub use query::{
    format_query_file, QueryFileError, QueryRenderer, QueryTemplate, TemplateError,
    DEFAULT_CUSTOM_QUERIES_DIR, QUERY_KEYS,
};
pub use sync::{
    escaped_columns, key_properties, row_to_singer_message, selected_columns,
    send_schema_message, should_sync_column, RowConverter, SyncError,
};

#[derive(Parser, Clone, Debug)]
pub struct TapOpts {
    /// Directory holding custom query files
    #[arg(
        long,
        default_value = DEFAULT_CUSTOM_QUERIES_DIR,
        env = "TAP_ORACLE_CUSTOM_QUERIES_DIR"
    )]
    pub custom_queries_dir: PathBuf,
}

impl TapOpts {
    pub fn query_renderer(&self) -> QueryRenderer {
        QueryRenderer::new(self.custom_queries_dir.clone())
    }
}
