//! Chat membership repository.
//!
//! Membership rows are never hard-deleted by `remove_member`: leaving a chat
//! clears `isActive` and stamps `leftAt`, and joining again reactivates the
//! same row. Only active rows count for `is_member`, `find_by_chat` and
//! `chat_ids_for_user`.

use std::sync::Arc;

use chatstore_types::chat::{AddMemberRequest, ChatMember, UpdateMemberRequest};
use chatstore_types::config::PaginationConfig;
use chatstore_types::error::RepositoryError;
use chrono::Utc;
use tracing::warn;

use super::delegate_repository;
use super::generic::EntityRepository;
use crate::query::QueryBuilder;
use crate::store::EntityStore;

pub struct ChatMemberRepository<S> {
    inner: EntityRepository<ChatMember, S>,
}

impl<S: EntityStore<ChatMember>> ChatMemberRepository<S> {
    pub fn new(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            inner: EntityRepository::new(store, pagination),
        }
    }

    pub fn entities(&self) -> &EntityRepository<ChatMember, S> {
        &self.inner
    }

    fn create_record(&self, request: AddMemberRequest) -> Result<ChatMember, RepositoryError> {
        self.add_member(request)
    }

    fn active_query() -> QueryBuilder {
        QueryBuilder::new().where_equals("isActive", true)
    }

    /// Add a user to a chat.
    ///
    /// Returns `Conflict` if the user is already an active member. A former
    /// member is reactivated in place, keeping the row id.
    pub fn add_member(&self, request: AddMemberRequest) -> Result<ChatMember, RepositoryError> {
        let Some(existing) = self.find_membership(&request.chat_id, &request.user_id)? else {
            return self.inner.insert(|meta| ChatMember::from_request(meta, request));
        };

        if existing.is_active {
            warn!(
                chat_id = %request.chat_id,
                user_id = %request.user_id,
                "rejected duplicate chat membership"
            );
            return Err(RepositoryError::Conflict(format!(
                "user '{}' is already a member of chat '{}'",
                request.user_id, request.chat_id
            )));
        }

        let patch = UpdateMemberRequest {
            role: request.role,
            is_active: Some(true),
            joined_at: Some(Utc::now()),
            left_at: Some(None),
        };
        // The row can vanish between the lookup and the update.
        self.inner.update(&existing.id, patch)?.ok_or_else(|| {
            RepositoryError::Conflict(format!(
                "membership '{}' was removed concurrently",
                existing.id
            ))
        })
    }

    /// Soft-delete an active membership. Returns `None` if the user is not an
    /// active member of the chat.
    pub fn remove_member(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Option<ChatMember>, RepositoryError> {
        match self.find_membership(chat_id, user_id)? {
            Some(member) if member.is_active => self.inner.update(
                &member.id,
                UpdateMemberRequest {
                    is_active: Some(false),
                    left_at: Some(Some(Utc::now())),
                    ..Default::default()
                },
            ),
            _ => Ok(None),
        }
    }

    /// Membership row for a (chat, user) pair, active or not.
    pub fn find_membership(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Option<ChatMember>, RepositoryError> {
        self.inner.find_one(
            &QueryBuilder::new()
                .where_equals("chatId", chat_id)
                .where_equals("userId", user_id)
                .build(),
        )
    }

    pub fn is_member(&self, chat_id: &str, user_id: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .find_membership(chat_id, user_id)?
            .is_some_and(|member| member.is_active))
    }

    /// Active members of a chat, oldest membership first.
    pub fn find_by_chat(&self, chat_id: &str) -> Result<Vec<ChatMember>, RepositoryError> {
        self.inner
            .find_all(&Self::active_query().where_equals("chatId", chat_id).build())
    }

    /// Active memberships of a user.
    pub fn find_by_user(&self, user_id: &str) -> Result<Vec<ChatMember>, RepositoryError> {
        self.inner
            .find_all(&Self::active_query().where_equals("userId", user_id).build())
    }

    /// Ids of the chats a user actively belongs to.
    pub fn chat_ids_for_user(&self, user_id: &str) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .find_by_user(user_id)?
            .into_iter()
            .map(|member| member.chat_id)
            .collect())
    }

    pub fn count_active(&self, chat_id: &str) -> Result<usize, RepositoryError> {
        self.inner
            .count(&Self::active_query().where_equals("chatId", chat_id).build())
    }
}

delegate_repository!(ChatMemberRepository, ChatMember, AddMemberRequest);
