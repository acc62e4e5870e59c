//! User repository.

use std::sync::Arc;

use chatstore_types::config::PaginationConfig;
use chatstore_types::error::RepositoryError;
use chatstore_types::record::Entity;
use chatstore_types::user::{CreateUserRequest, UpdateUserRequest, User, UserStatus};
use chrono::Utc;

use super::delegate_repository;
use super::generic::EntityRepository;
use crate::query::{ConditionalFilter, FilterOperator, QueryBuilder};
use crate::store::EntityStore;

pub struct UserRepository<S> {
    inner: EntityRepository<User, S>,
}

impl<S: EntityStore<User>> UserRepository<S> {
    pub fn new(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            inner: EntityRepository::new(store, pagination),
        }
    }

    /// The generic repository this one wraps.
    pub fn entities(&self) -> &EntityRepository<User, S> {
        &self.inner
    }

    fn create_record(&self, request: CreateUserRequest) -> Result<User, RepositoryError> {
        self.inner.insert(|meta| User::from_request(meta, request))
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.inner
            .find_one(&QueryBuilder::new().where_equals("username", username).build())
    }

    /// Email lookup ignores ASCII case.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .inner
            .find_by(|user| user.email.eq_ignore_ascii_case(email))?
            .into_iter()
            .next())
    }

    /// Users whose username or display name contains `term`, case-insensitive.
    pub fn search(&self, term: &str) -> Result<Vec<User>, RepositoryError> {
        let by_username = ConditionalFilter::new("username", FilterOperator::Contains, term);
        let by_display_name = ConditionalFilter::new("displayName", FilterOperator::Contains, term);
        self.inner.find_by(|user| {
            let document = user.to_document();
            by_username.matches(&document) || by_display_name.matches(&document)
        })
    }

    /// Change presence. Going offline also records `lastSeenAt`.
    pub fn set_status(
        &self,
        id: &str,
        status: UserStatus,
    ) -> Result<Option<User>, RepositoryError> {
        let last_seen_at = (status == UserStatus::Offline).then(Utc::now);
        self.inner.update(
            id,
            UpdateUserRequest {
                status: Some(status),
                last_seen_at,
                ..Default::default()
            },
        )
    }
}

delegate_repository!(UserRepository, User, CreateUserRequest);
