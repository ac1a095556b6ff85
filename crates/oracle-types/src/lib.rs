//! Oracle type handling for singer-types.
//!
//! This crate turns Oracle rows into Singer values and builds the SQL
//! fragments the sync strategies need.
//!
//! # Structure
//!
//! - `value`: raw values as returned by the row cursor
//! - `number`: exact NUMBER values and their textual form
//! - `coercion`: per-column `OracleValue` → `RecordValue` conversion
//! - `sql`: column list and WHERE-clause literal builders
//! - `fetch`: row-fetch buffer selection per column type
//!
//! # Example
//!
//! ```rust
//! use oracle_types::{prepare_where_clause_arg, Coercion, OracleValue};
//! use singer_types::{RecordValue, Schema};
//!
//! let coercion = Coercion::for_property(&Schema::of_type(vec!["null", "boolean"]));
//! assert_eq!(coercion.apply(OracleValue::Integer(1)).unwrap(), RecordValue::Bool(true));
//!
//! assert_eq!(prepare_where_clause_arg("2020-01-01", "DATE"), "to_date('2020-01-01')");
//! ```

pub mod coercion;
pub mod fetch;
pub mod number;
pub mod sql;
pub mod value;

pub use coercion::{Coercion, CoercionError, BLOB_DESCRIPTION, MAX_DECIMAL_DIGITS};
pub use fetch::{DbTypeMarker, DefaultFetchBuffers, FetchBuffer, FetchBufferHandler};
pub use number::{NumberParseError, OracleNumber};
pub use sql::{
    escape_column, prepare_columns_sql, prepare_where_clause_arg, LiteralKind, SqlFragmentError,
};
pub use value::OracleValue;
