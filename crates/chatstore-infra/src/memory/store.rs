//! Process-local entity store.
//!
//! `MemoryStore` keeps a `DashMap` registry from entity type to its
//! collection. A collection is created the first time its type is touched
//! and lives behind its own `RwLock`, so writers to `messages` never wait
//! on readers of `chats`.
//!
//! Records are cloned out on every read; no lock guard outlives the call
//! that took it.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chatstore_core::store::EntityStore;
use chatstore_observe::store_attrs;
use chatstore_types::error::RepositoryError;
use chatstore_types::record::{Entity, RecordMeta};
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

/// Records of one entity type, keyed by insertion sequence so iteration
/// yields natural (insertion) order.
struct Collection<E> {
    rows: BTreeMap<u64, E>,
    index: HashMap<String, u64>,
    next_seq: u64,
}

impl<E: Entity> Collection<E> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
        }
    }

    fn insert(&mut self, record: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(record.id().to_string(), seq);
        self.rows.insert(seq, record);
    }

    fn get(&self, id: &str) -> Option<&E> {
        self.index.get(id).and_then(|seq| self.rows.get(seq))
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut E> {
        let seq = *self.index.get(id)?;
        self.rows.get_mut(&seq)
    }

    fn remove(&mut self, id: &str) -> bool {
        match self.index.remove(id) {
            Some(seq) => self.rows.remove(&seq).is_some(),
            None => false,
        }
    }

    // `next_seq` is kept so order stays monotonic across a clear.
    fn clear(&mut self) {
        self.rows.clear();
        self.index.clear();
    }
}

type SharedCollection<E> = Arc<RwLock<Collection<E>>>;

/// Concurrent in-memory store for every entity type.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new store behind an `Arc`, ready to hand to repositories.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of collections created so far.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    fn collection<E: Entity>(&self) -> SharedCollection<E> {
        let key = TypeId::of::<E>();
        let erased = match self.collections.get(&key) {
            Some(existing) => Arc::clone(existing.value()),
            None => Arc::clone(
                self.collections
                    .entry(key)
                    .or_insert_with(|| {
                        tracing::debug!(
                            { store_attrs::COLLECTION } = E::COLLECTION,
                            "collection created"
                        );
                        let fresh: Arc<dyn Any + Send + Sync> =
                            Arc::new(RwLock::new(Collection::<E>::new()));
                        fresh
                    })
                    .value(),
            ),
        };
        match erased.downcast::<RwLock<Collection<E>>>() {
            Ok(collection) => collection,
            // Entries are keyed by `TypeId::of::<E>()` and only ever hold a
            // `Collection<E>`.
            Err(_) => unreachable!("collection registry entry has the wrong type"),
        }
    }
}

fn read<E: Entity>(
    collection: &RwLock<Collection<E>>,
) -> Result<RwLockReadGuard<'_, Collection<E>>, RepositoryError> {
    collection
        .read()
        .map_err(|_| RepositoryError::LockPoisoned(E::COLLECTION))
}

fn write<E: Entity>(
    collection: &RwLock<Collection<E>>,
) -> Result<RwLockWriteGuard<'_, Collection<E>>, RepositoryError> {
    collection
        .write()
        .map_err(|_| RepositoryError::LockPoisoned(E::COLLECTION))
}

impl<E: Entity> EntityStore<E> for MemoryStore {
    fn create<F>(&self, build: F) -> Result<E, RepositoryError>
    where
        F: FnOnce(RecordMeta) -> E,
    {
        let collection = self.collection::<E>();
        let mut guard = write(&collection)?;

        // Generated under the write lock; v7 ids are never handed out twice.
        let meta = RecordMeta::new(Uuid::now_v7().to_string(), Utc::now());
        let record = build(meta);
        guard.insert(record.clone());

        tracing::trace!(
            { store_attrs::COLLECTION } = E::COLLECTION,
            { store_attrs::RECORD_ID } = record.id(),
            "inserted"
        );
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<Option<E>, RepositoryError> {
        let collection = self.collection::<E>();
        let guard = read(&collection)?;
        Ok(guard.get(id).cloned())
    }

    fn update(&self, id: &str, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        let collection = self.collection::<E>();
        let mut guard = write(&collection)?;
        let Some(record) = guard.get_mut(id) else {
            return Ok(None);
        };
        record.apply_patch(patch);
        record.touch(Utc::now());
        Ok(Some(record.clone()))
    }

    fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let collection = self.collection::<E>();
        let mut guard = write(&collection)?;
        Ok(guard.remove(id))
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        let collection = self.collection::<E>();
        let mut guard = write(&collection)?;
        let removed = guard.rows.len();
        guard.clear();
        tracing::debug!(
            { store_attrs::COLLECTION } = E::COLLECTION,
            removed,
            "collection cleared"
        );
        Ok(())
    }

    fn snapshot(&self) -> Result<Vec<E>, RepositoryError> {
        let collection = self.collection::<E>();
        let guard = read(&collection)?;
        Ok(guard.rows.values().cloned().collect())
    }

    fn len(&self) -> Result<usize, RepositoryError> {
        let collection = self.collection::<E>();
        let guard = read(&collection)?;
        Ok(guard.rows.len())
    }
}
