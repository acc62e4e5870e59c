//! Repository trait definitions and the per-entity repositories.
//!
//! Every repository is written against the [`EntityStore`](crate::store::EntityStore)
//! port, so the same code runs over the in-memory store in `chatstore-infra`
//! and over the small test store used by this crate's unit tests.

pub mod chat;
pub mod generic;
pub mod member;
pub mod message;
pub mod user;

#[cfg(test)]
pub(crate) mod test_store;

use chatstore_types::error::RepositoryError;
use chatstore_types::record::Entity;

use crate::query::FindOptions;

pub use chat::ChatRepository;
pub use generic::EntityRepository;
pub use member::ChatMemberRepository;
pub use message::MessageRepository;
pub use user::UserRepository;

/// CRUD surface shared by every entity repository.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
/// A missing record is reported as `None` / `false`, never as an error.
pub trait Repository<E: Entity>: Send + Sync {
    /// Payload accepted by `create`. The store assigns `id`, `createdAt` and
    /// `updatedAt`.
    type CreateRequest: Send;

    fn create(
        &self,
        request: Self::CreateRequest,
    ) -> impl std::future::Future<Output = Result<E, RepositoryError>> + Send;

    fn find_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<E>, RepositoryError>> + Send;

    /// Records matching `options`, sorted and sliced as it describes.
    fn find_all(
        &self,
        options: &FindOptions,
    ) -> impl std::future::Future<Output = Result<Vec<E>, RepositoryError>> + Send;

    /// Merge a partial update. Returns `None` when the id is absent.
    fn update(
        &self,
        id: &str,
        patch: E::Patch,
    ) -> impl std::future::Future<Output = Result<Option<E>, RepositoryError>> + Send;

    /// Returns `true` if a record was removed.
    fn delete(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Number of records passing the filters of `options`. Ordering, limit
    /// and offset are ignored.
    fn count(
        &self,
        options: &FindOptions,
    ) -> impl std::future::Future<Output = Result<usize, RepositoryError>> + Send;
}

/// Implements [`Repository`] for a wrapper whose `inner` field is an
/// [`EntityRepository`].
///
/// `create` goes through the wrapper's own `create_record`, so entity rules
/// (such as the membership conflict check) apply to the trait surface too.
macro_rules! delegate_repository {
    ($repo:ident, $entity:ty, $create:ty) => {
        impl<S> $crate::repository::Repository<$entity> for $repo<S>
        where
            S: $crate::store::EntityStore<$entity>,
        {
            type CreateRequest = $create;

            async fn create(
                &self,
                request: $create,
            ) -> Result<$entity, chatstore_types::error::RepositoryError> {
                self.create_record(request)
            }

            async fn find_by_id(
                &self,
                id: &str,
            ) -> Result<Option<$entity>, chatstore_types::error::RepositoryError> {
                self.inner.find_by_id(id)
            }

            async fn find_all(
                &self,
                options: &$crate::query::FindOptions,
            ) -> Result<Vec<$entity>, chatstore_types::error::RepositoryError> {
                self.inner.find_all(options)
            }

            async fn update(
                &self,
                id: &str,
                patch: <$entity as chatstore_types::record::Entity>::Patch,
            ) -> Result<Option<$entity>, chatstore_types::error::RepositoryError> {
                self.inner.update(id, patch)
            }

            async fn delete(
                &self,
                id: &str,
            ) -> Result<bool, chatstore_types::error::RepositoryError> {
                self.inner.delete(id)
            }

            async fn count(
                &self,
                options: &$crate::query::FindOptions,
            ) -> Result<usize, chatstore_types::error::RepositoryError> {
                self.inner.count(options)
            }
        }
    };
}

pub(crate) use delegate_repository;
