//! Record plumbing shared by every stored entity.
//!
//! The entity store is generic over [`Entity`]: it only needs to know the
//! collection a record belongs to, its identifier, how to patch it and how
//! to refresh its `updatedAt` stamp. The query layer inspects records
//! through [`Entity::to_document`], the camelCase JSON view of the record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Identity and timestamps assigned by the store when a record is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Metadata for a record created at `now`. Both stamps start equal.
    pub fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A record type held in its own collection of the entity store.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Collection name (e.g. "messages").
    const COLLECTION: &'static str;

    /// Document field that pagination cursors key on.
    const CURSOR_FIELD: &'static str;

    /// Partial update applied by `update`.
    type Patch: Send;

    /// Store-assigned identifier. Immutable after creation.
    fn id(&self) -> &str;

    /// Value of the ordering field named by [`Entity::CURSOR_FIELD`].
    fn cursor_timestamp(&self) -> DateTime<Utc>;

    /// Merge a patch onto this record. Must not touch `id` or `createdAt`.
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Refresh the `updatedAt` stamp.
    fn touch(&mut self, now: DateTime<Utc>);

    /// The camelCase JSON document the filter evaluator and sorter read.
    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Assign `value` to `slot` when the patch carries it.
pub(crate) fn patch_field<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_meta_stamps_match() {
        let now = Utc::now();
        let meta = RecordMeta::new("abc".to_string(), now);
        assert_eq!(meta.id, "abc");
        assert_eq!(meta.created_at, meta.updated_at);
    }

    #[test]
    fn test_patch_field_only_overwrites_some() {
        let mut name = "luna".to_string();
        patch_field(&mut name, None);
        assert_eq!(name, "luna");
        patch_field(&mut name, Some("nova".to_string()));
        assert_eq!(name, "nova");
    }
}
