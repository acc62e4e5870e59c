//! Minimal `EntityStore` for unit tests.
//!
//! Holds each collection in a `Mutex<Vec<_>>` and stamps records from a
//! fake clock that advances one second per write, so ordering assertions
//! never depend on wall-clock resolution.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use chatstore_types::chat::{Chat, ChatMember};
use chatstore_types::error::RepositoryError;
use chatstore_types::message::Message;
use chatstore_types::record::{Entity, RecordMeta};
use chatstore_types::user::User;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::store::EntityStore;

pub(crate) struct Table<E> {
    rows: Mutex<Vec<E>>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

#[derive(Default)]
pub(crate) struct TestStore {
    tick: AtomicI64,
    users: Table<User>,
    chats: Table<Chat>,
    members: Table<ChatMember>,
    messages: Table<Message>,
}

impl TestStore {
    pub(crate) fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// Time of the n-th write (1-based).
    pub(crate) fn at(n: i64) -> DateTime<Utc> {
        Self::epoch() + Duration::seconds(n)
    }

    fn now(&self) -> (i64, DateTime<Utc>) {
        let n = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        (n, Self::at(n))
    }

    fn insert_into<E: Entity>(
        &self,
        table: &Table<E>,
        build: impl FnOnce(RecordMeta) -> E,
    ) -> Result<E, RepositoryError> {
        let mut rows = table.rows.lock().unwrap();
        let (n, now) = self.now();
        let record = build(RecordMeta::new(format!("{}-{n}", E::COLLECTION), now));
        rows.push(record.clone());
        Ok(record)
    }

    fn patch_in<E: Entity>(
        &self,
        table: &Table<E>,
        id: &str,
        patch: E::Patch,
    ) -> Result<Option<E>, RepositoryError> {
        let mut rows = table.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        let (_, now) = self.now();
        row.apply_patch(patch);
        row.touch(now);
        Ok(Some(row.clone()))
    }
}

macro_rules! test_store_for {
    ($entity:ty, $field:ident) => {
        impl EntityStore<$entity> for TestStore {
            fn create<F>(&self, build: F) -> Result<$entity, RepositoryError>
            where
                F: FnOnce(RecordMeta) -> $entity,
            {
                self.insert_into(&self.$field, build)
            }

            fn get(&self, id: &str) -> Result<Option<$entity>, RepositoryError> {
                let rows = self.$field.rows.lock().unwrap();
                Ok(rows.iter().find(|r| r.id() == id).cloned())
            }

            fn update(
                &self,
                id: &str,
                patch: <$entity as Entity>::Patch,
            ) -> Result<Option<$entity>, RepositoryError> {
                self.patch_in(&self.$field, id, patch)
            }

            fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
                let mut rows = self.$field.rows.lock().unwrap();
                let before = rows.len();
                rows.retain(|r| r.id() != id);
                Ok(rows.len() != before)
            }

            fn clear(&self) -> Result<(), RepositoryError> {
                self.$field.rows.lock().unwrap().clear();
                Ok(())
            }

            fn snapshot(&self) -> Result<Vec<$entity>, RepositoryError> {
                Ok(self.$field.rows.lock().unwrap().clone())
            }

            fn len(&self) -> Result<usize, RepositoryError> {
                Ok(self.$field.rows.lock().unwrap().len())
            }
        }
    };
}

test_store_for!(User, users);
test_store_for!(Chat, chats);
test_store_for!(ChatMember, members);
test_store_for!(Message, messages);
