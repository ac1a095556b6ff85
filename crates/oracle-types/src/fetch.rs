//! Row-fetch buffer selection.
//!
//! The driver asks, per result column, whether the tap wants a different
//! buffer than its default. NUMBER columns are read as exact decimals and
//! LOBs are read inline instead of as locators.

/// Database type marker reported by the driver for a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTypeMarker {
    Number,
    Clob,
    Nclob,
    Blob,
    /// Any other type, by its driver name
    Other(String),
}

impl DbTypeMarker {
    /// Parse a driver type name such as `DB_TYPE_NUMBER` or `CLOB`.
    pub fn from_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        match upper.strip_prefix("DB_TYPE_").unwrap_or(upper.as_str()) {
            "NUMBER" => Self::Number,
            "CLOB" => Self::Clob,
            "NCLOB" => Self::Nclob,
            "BLOB" => Self::Blob,
            _ => Self::Other(name.to_string()),
        }
    }
}

/// Buffer the driver should fetch a column into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchBuffer {
    /// Exact decimal text, producing [`crate::OracleValue::Number`]
    Decimal,
    /// Whole character LOB as text
    LongString,
    /// Whole binary LOB as bytes
    LongBinary,
}

/// Chooses a fetch buffer per column type.
pub trait FetchBufferHandler {
    /// `None` keeps the driver's default buffer.
    fn fetch_buffer(&self, db_type: &DbTypeMarker) -> Option<FetchBuffer>;
}

/// The tap's standard choices.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFetchBuffers;

impl FetchBufferHandler for DefaultFetchBuffers {
    fn fetch_buffer(&self, db_type: &DbTypeMarker) -> Option<FetchBuffer> {
        match db_type {
            DbTypeMarker::Number => Some(FetchBuffer::Decimal),
            DbTypeMarker::Clob | DbTypeMarker::Nclob => Some(FetchBuffer::LongString),
            DbTypeMarker::Blob => Some(FetchBuffer::LongBinary),
            DbTypeMarker::Other(_) => None,
        }
    }
}

impl<F> FetchBufferHandler for F
where
    F: Fn(&DbTypeMarker) -> Option<FetchBuffer>,
{
    fn fetch_buffer(&self, db_type: &DbTypeMarker) -> Option<FetchBuffer> {
        self(db_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fetch_buffers() {
        let handler = DefaultFetchBuffers;
        assert_eq!(
            handler.fetch_buffer(&DbTypeMarker::Number),
            Some(FetchBuffer::Decimal)
        );
        assert_eq!(
            handler.fetch_buffer(&DbTypeMarker::Clob),
            Some(FetchBuffer::LongString)
        );
        assert_eq!(
            handler.fetch_buffer(&DbTypeMarker::Nclob),
            Some(FetchBuffer::LongString)
        );
        assert_eq!(
            handler.fetch_buffer(&DbTypeMarker::Blob),
            Some(FetchBuffer::LongBinary)
        );
        assert_eq!(
            handler.fetch_buffer(&DbTypeMarker::from_name("DB_TYPE_VARCHAR")),
            None
        );
    }

    #[test]
    fn test_marker_from_driver_name() {
        assert_eq!(DbTypeMarker::from_name("DB_TYPE_NUMBER"), DbTypeMarker::Number);
        assert_eq!(DbTypeMarker::from_name("nclob"), DbTypeMarker::Nclob);
        assert_eq!(
            DbTypeMarker::from_name("DB_TYPE_RAW"),
            DbTypeMarker::Other("DB_TYPE_RAW".to_string())
        );
    }

    #[test]
    fn test_closure_handler() {
        let only_blobs = |t: &DbTypeMarker| (*t == DbTypeMarker::Blob).then_some(FetchBuffer::LongBinary);
        assert_eq!(only_blobs.fetch_buffer(&DbTypeMarker::Number), None);
        assert_eq!(
            only_blobs.fetch_buffer(&DbTypeMarker::Blob),
            Some(FetchBuffer::LongBinary)
        );
    }
}
