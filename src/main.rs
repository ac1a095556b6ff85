//! Command-line interface for tap-oracle
//!
//! # Usage Examples
//!
//! ## Custom queries
//! ```bash
//! # Render custom_queries/chicken.sql with the selected columns of a stream
//! tap-oracle render-query chicken.sql \
//!   --catalog catalog.json \
//!   --stream ORCL-ROOT-CHICKEN \
//!   --replication-key-value "2020-01-01 00:00:00"
//!
//! # Read query files from another directory
//! TAP_ORACLE_CUSTOM_QUERIES_DIR=/etc/tap-oracle/queries tap-oracle render-query ...
//! ```
//!
//! ## Schema messages
//! ```bash
//! tap-oracle schema --catalog catalog.json --stream ORCL-ROOT-CHICKEN \
//!   --bookmark-property UPDATED_AT
//! ```
//!
//! Singer messages go to stdout, logs (`RUST_LOG=info`) to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use singer_types::{Catalog, CatalogEntry, JsonLinesSink};
use std::path::{Path, PathBuf};
use tap_oracle::{escaped_columns, selected_columns, send_schema_message, TapOpts};

#[derive(Parser)]
#[command(name = "tap-oracle")]
#[command(about = "Singer tap helpers for Oracle catalogs and custom queries")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    opts: TapOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a custom query file for a catalog stream
    RenderQuery {
        /// File name inside the custom queries directory
        query_file: String,

        /// Singer catalog file
        #[arg(long, value_name = "PATH")]
        catalog: PathBuf,

        /// tap_stream_id of the stream to render for
        #[arg(long)]
        stream: String,

        /// Current bookmark of the replication key
        #[arg(long)]
        replication_key_value: Option<String>,
    },

    /// Write the SCHEMA message of a catalog stream to stdout
    Schema {
        /// Singer catalog file
        #[arg(long, value_name = "PATH")]
        catalog: PathBuf,

        /// tap_stream_id of the stream
        #[arg(long)]
        stream: String,

        /// Bookmark properties to announce (repeatable)
        #[arg(long = "bookmark-property", value_name = "COLUMN")]
        bookmark_properties: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RenderQuery {
            query_file,
            catalog,
            stream,
            replication_key_value,
        } => {
            let catalog = load_catalog(&catalog)?;
            let stream = catalog.get_stream(&stream)?;
            let query = render_query(&cli.opts, stream, &query_file, replication_key_value)?;
            println!("{query}");
        }
        Commands::Schema {
            catalog,
            stream,
            bookmark_properties,
        } => {
            let catalog = load_catalog(&catalog)?;
            let stream = catalog.get_stream(&stream)?;
            send_schema_message(stream, Some(bookmark_properties), &mut JsonLinesSink::stdout())
                .with_context(|| format!("Failed to write schema of {}", stream.tap_stream_id))?;
        }
    }

    Ok(())
}

fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    Catalog::from_file(path).with_context(|| format!("Failed to load catalog from {path:?}"))
}

fn render_query(
    opts: &TapOpts,
    stream: &CatalogEntry,
    query_file: &str,
    replication_key_value: Option<String>,
) -> anyhow::Result<String> {
    let md = stream.metadata.stream();
    let schema_name = md
        .schema_name
        .as_deref()
        .with_context(|| format!("Stream {} has no schema-name metadata", stream.tap_stream_id))?;
    let table_name = stream
        .table_name
        .as_deref()
        .or(stream.stream.as_deref())
        .unwrap_or(&stream.tap_stream_id);

    let replication_key_datatype = md
        .replication_key
        .as_deref()
        .and_then(|key| stream.metadata.field(key))
        .and_then(|field| field.sql_datatype.as_deref());

    let columns = selected_columns(stream);
    let escaped = escaped_columns(stream, &columns)?;

    let query = opts
        .query_renderer()
        .format_query_file(
            query_file,
            &escaped,
            &format!("\"{schema_name}\""),
            &format!("\"{table_name}\""),
            replication_key_value.as_deref(),
            replication_key_datatype,
        )
        .with_context(|| format!("Failed to render {query_file} for {}", stream.tap_stream_id))?;
    Ok(query)
}
