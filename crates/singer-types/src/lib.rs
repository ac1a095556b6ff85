//! Singer data model for tap-oracle.
//!
//! This crate provides the types shared by every stage of the tap:
//!
//! - [`Schema`] - the JSON Schema subset describing a stream's columns
//! - [`MetadataMap`] - stream and field metadata keyed by [`Breadcrumb`]
//! - [`should_sync_field`] - the field selection policy
//! - [`Catalog`] / [`CatalogEntry`] - streams as discovered and selected
//! - [`Message`] - SCHEMA, RECORD, ACTIVATE_VERSION and STATE messages
//! - [`MessageSink`] - where messages go
//!
//! # Architecture
//!
//! ```text
//! singer-types (this crate)
//!    │
//!    ├─── oracle-types   (Oracle values, coercion and SQL fragments)
//!    │
//!    └─── tap-oracle     (schema/record emission, custom queries)
//! ```

pub mod catalog;
pub mod messages;
pub mod metadata;
pub mod schema;
pub mod sink;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use messages::{
    ActivateVersionMessage, Message, Record, RecordMessage, RecordValue, SchemaMessage,
    StateMessage,
};
pub use metadata::{
    should_sync_field, Breadcrumb, FieldMetadata, Inclusion, MetadataError, MetadataMap,
    MetadataRef, StreamMetadata,
};
pub use schema::{JsonType, Schema, DATE_TIME_FORMAT, DECIMAL_FORMAT};
pub use sink::{JsonLinesSink, MessageSink, SinkError};
