//! Message repository.
//!
//! Message histories are paged on `createdAt` (id breaks ties), and always
//! come back in ascending display order whichever direction was requested.

use std::sync::Arc;

use chatstore_types::config::PaginationConfig;
use chatstore_types::error::RepositoryError;
use chatstore_types::message::{CreateMessageRequest, Message, UpdateMessageRequest};

use super::delegate_repository;
use super::generic::EntityRepository;
use crate::pagination::{PaginatedResult, PaginationParams};
use crate::query::{OrderDirection, QueryBuilder};
use crate::store::EntityStore;

pub struct MessageRepository<S> {
    inner: EntityRepository<Message, S>,
}

impl<S: EntityStore<Message>> MessageRepository<S> {
    pub fn new(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            inner: EntityRepository::new(store, pagination),
        }
    }

    pub fn entities(&self) -> &EntityRepository<Message, S> {
        &self.inner
    }

    fn create_record(&self, request: CreateMessageRequest) -> Result<Message, RepositoryError> {
        self.inner.insert(|meta| Message::from_request(meta, request))
    }

    fn in_chat(chat_id: &str) -> QueryBuilder {
        QueryBuilder::new().where_equals("chatId", chat_id)
    }

    /// Messages of a chat, oldest first, optionally capped at `limit`.
    pub fn find_by_chat(
        &self,
        chat_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut query = Self::in_chat(chat_id).order_by("createdAt", OrderDirection::Asc);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.inner.find_all(&query.build())
    }

    pub fn count_by_chat(&self, chat_id: &str) -> Result<usize, RepositoryError> {
        self.inner.count(&Self::in_chat(chat_id).build())
    }

    /// Messages of a chat whose content contains `term`, case-insensitive.
    pub fn search_in_chat(
        &self,
        chat_id: &str,
        term: &str,
    ) -> Result<Vec<Message>, RepositoryError> {
        self.inner.find_all(
            &Self::in_chat(chat_id)
                .where_contains("content", term)
                .order_by("createdAt", OrderDirection::Asc)
                .build(),
        )
    }

    /// Replace the content of a message and flag it as edited.
    pub fn edit_content(
        &self,
        id: &str,
        content: impl Into<String>,
    ) -> Result<Option<Message>, RepositoryError> {
        self.inner.update(
            id,
            UpdateMessageRequest {
                content: Some(content.into()),
                is_edited: Some(true),
            },
        )
    }

    /// One page of a chat's history.
    pub fn get_chat_messages_paginated(
        &self,
        chat_id: &str,
        params: &PaginationParams,
    ) -> Result<PaginatedResult<Message>, RepositoryError> {
        self.inner.paginate(&Self::in_chat(chat_id).build(), params)
    }
}

delegate_repository!(MessageRepository, Message, CreateMessageRequest);
