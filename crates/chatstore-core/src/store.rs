//! Entity store port.
//!
//! The store owns every collection and is the only shared mutable state.
//! Repositories hold an `Arc` to a store and reach a collection through the
//! `EntityStore<E>` capability for their entity type; they never keep a
//! private copy of a collection.

use chatstore_types::error::RepositoryError;
use chatstore_types::record::{Entity, RecordMeta};

/// Storage capability for one entity type.
///
/// Implementations must generate the identifier inside the same critical
/// section that inserts the record, so two concurrent `create` calls can
/// never receive the same id, and ids are never reused after a delete.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Assign a fresh id and the current time, build the record from that
    /// metadata and insert it. Returns the stored record.
    fn create<F>(&self, build: F) -> Result<E, RepositoryError>
    where
        F: FnOnce(RecordMeta) -> E;

    /// Get a record by id.
    fn get(&self, id: &str) -> Result<Option<E>, RepositoryError>;

    /// Merge `patch` onto an existing record and refresh its `updatedAt`.
    /// Returns `None` when the id is absent.
    fn update(&self, id: &str, patch: E::Patch) -> Result<Option<E>, RepositoryError>;

    /// Remove a record. Returns `true` if something was removed.
    fn delete(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Empty the collection. Used by seeding.
    fn clear(&self) -> Result<(), RepositoryError>;

    /// Consistent copy of the collection in insertion order.
    fn snapshot(&self) -> Result<Vec<E>, RepositoryError>;

    /// Number of records in the collection.
    fn len(&self) -> Result<usize, RepositoryError>;
}
