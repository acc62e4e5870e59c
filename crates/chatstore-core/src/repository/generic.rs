//! Generic repository over one entity collection.
//!
//! [`EntityRepository`] holds an `Arc` to the shared store and runs every
//! query against a fresh snapshot of its collection. It is the building
//! block the entity-specific repositories wrap.

use std::marker::PhantomData;
use std::sync::Arc;

use chatstore_observe::store_attrs;
use chatstore_types::config::PaginationConfig;
use chatstore_types::error::RepositoryError;
use chatstore_types::record::{Entity, RecordMeta};
use tracing::debug;

use crate::pagination::{
    Connection, ConnectionArgs, PaginatedResult, PaginationParams, paginate, window,
};
use crate::query::FindOptions;
use crate::store::EntityStore;

pub struct EntityRepository<E, S> {
    store: Arc<S>,
    pagination: PaginationConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> Clone for EntityRepository<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pagination: self.pagination,
            _entity: PhantomData,
        }
    }
}

impl<E, S> EntityRepository<E, S>
where
    E: Entity,
    S: EntityStore<E>,
{
    pub fn new(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            store,
            pagination,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn pagination_config(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// Create a record from store-assigned metadata.
    pub fn insert<F>(&self, build: F) -> Result<E, RepositoryError>
    where
        F: FnOnce(RecordMeta) -> E,
    {
        let record = self.store.create(build)?;
        debug!(
            { store_attrs::COLLECTION } = E::COLLECTION,
            { store_attrs::OPERATION } = store_attrs::OP_CREATE,
            { store_attrs::RECORD_ID } = record.id(),
            "record created"
        );
        Ok(record)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<E>, RepositoryError> {
        self.store.get(id)
    }

    pub fn find_all(&self, options: &FindOptions) -> Result<Vec<E>, RepositoryError> {
        let _span = tracing::debug_span!(
            "repository.find_all",
            { store_attrs::COLLECTION } = E::COLLECTION,
            { store_attrs::OPERATION } = store_attrs::OP_FIND_ALL,
            { store_attrs::FILTER_COUNT } = options.conditional_filters.len(),
        )
        .entered();

        let rows = options.apply(self.store.snapshot()?);
        debug!({ store_attrs::RESULT_COUNT } = rows.len(), "query evaluated");
        Ok(rows)
    }

    /// First record matching `options` in its requested order.
    pub fn find_one(&self, options: &FindOptions) -> Result<Option<E>, RepositoryError> {
        let options = FindOptions {
            limit: Some(1),
            ..options.clone()
        };
        Ok(self.find_all(&options)?.into_iter().next())
    }

    /// Records satisfying an arbitrary predicate, in insertion order.
    ///
    /// For conditions the operator set cannot express, such as an OR across
    /// fields.
    pub fn find_by<P>(&self, predicate: P) -> Result<Vec<E>, RepositoryError>
    where
        P: Fn(&E) -> bool,
    {
        let mut rows = self.store.snapshot()?;
        rows.retain(|record| predicate(record));
        Ok(rows)
    }

    pub fn count(&self, options: &FindOptions) -> Result<usize, RepositoryError> {
        let count = if options.filter.is_none() && options.conditional_filters.is_empty() {
            self.store.len()?
        } else {
            options.filter_records(self.store.snapshot()?).len()
        };
        tracing::trace!(
            { store_attrs::COLLECTION } = E::COLLECTION,
            { store_attrs::OPERATION } = store_attrs::OP_COUNT,
            { store_attrs::RESULT_COUNT } = count,
            "records counted"
        );
        Ok(count)
    }

    pub fn update(&self, id: &str, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        let updated = self.store.update(id, patch)?;
        debug!(
            { store_attrs::COLLECTION } = E::COLLECTION,
            { store_attrs::OPERATION } = store_attrs::OP_UPDATE,
            { store_attrs::RECORD_ID } = id,
            found = updated.is_some(),
            "record updated"
        );
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let removed = self.store.delete(id)?;
        debug!(
            { store_attrs::COLLECTION } = E::COLLECTION,
            { store_attrs::OPERATION } = store_attrs::OP_DELETE,
            { store_attrs::RECORD_ID } = id,
            removed,
            "record deleted"
        );
        Ok(removed)
    }

    /// Empty the collection.
    pub fn clear(&self) -> Result<(), RepositoryError> {
        self.store.clear()
    }

    /// Page through the records matching the filters of `options`.
    ///
    /// Ordering always follows the entity's cursor field with id as the
    /// tie-break; `order_by`, `limit` and `offset` in `options` are ignored.
    /// `total_count` is the number of matching records before cursor
    /// trimming. Cursor errors are reported before the store is read.
    pub fn paginate(
        &self,
        options: &FindOptions,
        params: &PaginationParams,
    ) -> Result<PaginatedResult<E>, RepositoryError> {
        let params = params.clone().clamped(&self.pagination);
        params.validate()?;

        let _span = tracing::debug_span!(
            "repository.paginate",
            { store_attrs::COLLECTION } = E::COLLECTION,
            { store_attrs::OPERATION } = store_attrs::OP_PAGINATE,
            { store_attrs::PAGE_SIZE } = params.limit,
            { store_attrs::PAGE_DIRECTION } = %params.direction,
            { store_attrs::PAGE_ORDER_FIELD } = E::CURSOR_FIELD,
        )
        .entered();

        let candidates = options.filter_records(self.store.snapshot()?);
        let total_count = candidates.len();
        let page = PaginatedResult::from_window(window(candidates, &params)?, total_count);
        debug!(
            { store_attrs::RESULT_COUNT } = page.items.len(),
            total_count,
            has_next_page = page.has_next_page,
            has_previous_page = page.has_previous_page,
            "page built"
        );
        Ok(page)
    }

    /// Relay connection over the records matching the filters of `options`.
    pub fn connection(
        &self,
        options: &FindOptions,
        args: &ConnectionArgs,
    ) -> Result<Connection<E>, RepositoryError> {
        args.to_params(&self.pagination)?.validate()?;
        let candidates = options.filter_records(self.store.snapshot()?);
        let total_count = candidates.len();
        Ok(paginate(candidates, args, total_count, &self.pagination)?)
    }
}
