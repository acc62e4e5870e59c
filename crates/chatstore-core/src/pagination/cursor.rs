//! Opaque pagination cursors.
//!
//! A cursor is the base64 encoding of `"<RFC 3339 timestamp>|<id>"`. The
//! encoding only makes the token opaque to callers; it is not signed and is
//! not a security boundary.

use std::cmp::Ordering;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chatstore_types::error::CursorError;
use chatstore_types::record::Entity;
use chrono::{DateTime, SecondsFormat, Utc};

/// Separator between the timestamp and the id inside a decoded cursor.
pub const CURSOR_SEPARATOR: char = '|';

/// The stable sort key a cursor points at: ordering timestamp, then id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorKey {
    pub timestamp: DateTime<Utc>,
    pub id: String,
}

impl CursorKey {
    pub fn new(timestamp: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            timestamp,
            id: id.into(),
        }
    }

    /// Sort key of a record, on its entity's cursor field.
    pub fn of<E: Entity>(record: &E) -> Self {
        Self::new(record.cursor_timestamp(), record.id())
    }

    pub fn encode(&self) -> String {
        encode_cursor(self.timestamp, &self.id)
    }

    pub fn decode(cursor: &str) -> Result<Self, CursorError> {
        decode_cursor(cursor)
    }
}

impl Ord for CursorKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for CursorKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Encode a `(timestamp, id)` pair into an opaque cursor.
pub fn encode_cursor(timestamp: DateTime<Utc>, id: &str) -> String {
    let raw = format!(
        "{}{}{}",
        timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        CURSOR_SEPARATOR,
        id
    );
    BASE64.encode(raw)
}

/// Decode a cursor produced by [`encode_cursor`].
pub fn decode_cursor(cursor: &str) -> Result<CursorKey, CursorError> {
    let bytes = BASE64.decode(cursor).map_err(|_| CursorError::Encoding)?;
    let raw = String::from_utf8(bytes).map_err(|_| CursorError::NotUtf8)?;

    // Timestamps never contain the separator; ids may.
    let (timestamp, id) = raw
        .split_once(CURSOR_SEPARATOR)
        .ok_or(CursorError::MissingSeparator)?;

    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| CursorError::InvalidTimestamp(timestamp.to_string()))?
        .with_timezone(&Utc);

    if id.is_empty() {
        return Err(CursorError::EmptyId);
    }

    Ok(CursorKey::new(timestamp, id))
}

/// Cursor of a record on its entity's ordering field.
pub fn cursor_for<E: Entity>(record: &E) -> String {
    CursorKey::of(record).encode()
}
