//! Chat repository.
//!
//! Chats are listed per user through an explicit join on the membership
//! collection, and paged on `updatedAt` so the most recently active chats
//! sit at the end a backward page starts from.

use std::collections::HashSet;
use std::sync::Arc;

use chatstore_types::chat::{
    AddMemberRequest, Chat, ChatMember, ChatType, CreateChatRequest, MemberRole, UpdateChatRequest,
};
use chatstore_types::config::PaginationConfig;
use chatstore_types::error::RepositoryError;
use chatstore_types::message::Message;
use chatstore_types::record::Entity;

use super::delegate_repository;
use super::generic::EntityRepository;
use super::member::ChatMemberRepository;
use crate::pagination::{PaginatedResult, PaginationParams};
use crate::query::{ConditionalFilter, FilterOperator, FindOptions, OrderDirection};
use crate::store::EntityStore;

pub struct ChatRepository<S> {
    inner: EntityRepository<Chat, S>,
    members: ChatMemberRepository<S>,
}

impl<S> ChatRepository<S>
where
    S: EntityStore<Chat> + EntityStore<ChatMember>,
{
    pub fn new(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            inner: EntityRepository::new(Arc::clone(&store), pagination),
            members: ChatMemberRepository::new(store, pagination),
        }
    }

    pub fn entities(&self) -> &EntityRepository<Chat, S> {
        &self.inner
    }

    pub fn members(&self) -> &ChatMemberRepository<S> {
        &self.members
    }

    /// Create a chat and its memberships: the creator as owner, everyone
    /// in `member_ids` as a plain member. Duplicate ids are skipped.
    ///
    /// Not atomic: a failure part-way leaves the chat with the members added
    /// so far.
    pub fn create_with_members(
        &self,
        request: CreateChatRequest,
        member_ids: &[String],
    ) -> Result<Chat, RepositoryError> {
        let chat = self.inner.insert(|meta| Chat::from_request(meta, request))?;

        let mut seen = HashSet::new();
        seen.insert(chat.created_by.as_str());
        self.members.add_member(AddMemberRequest {
            chat_id: chat.id.clone(),
            user_id: chat.created_by.clone(),
            role: Some(MemberRole::Owner),
            is_active: None,
        })?;
        for user_id in member_ids {
            if !seen.insert(user_id.as_str()) {
                continue;
            }
            self.members.add_member(AddMemberRequest {
                chat_id: chat.id.clone(),
                user_id: user_id.clone(),
                role: None,
                is_active: None,
            })?;
        }
        Ok(chat)
    }

    /// The direct chat whose active members are exactly `user_a` and
    /// `user_b`, if one exists.
    pub fn find_direct_chat(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<Option<Chat>, RepositoryError> {
        let of_b: HashSet<String> = self.members.chat_ids_for_user(user_b)?.into_iter().collect();

        for chat_id in self.members.chat_ids_for_user(user_a)? {
            if !of_b.contains(&chat_id) {
                continue;
            }
            let Some(chat) = self.inner.find_by_id(&chat_id)? else {
                continue;
            };
            if chat.chat_type != ChatType::Direct {
                continue;
            }
            let expected = if user_a == user_b { 1 } else { 2 };
            if self.members.count_active(&chat.id)? == expected {
                return Ok(Some(chat));
            }
        }
        Ok(None)
    }

    /// Record `message` as the chat's latest. Moves the chat's `updatedAt`
    /// forward, so chat cursors handed out earlier stop covering it.
    pub fn touch_last_message(
        &self,
        chat_id: &str,
        message: &Message,
    ) -> Result<Option<Chat>, RepositoryError> {
        self.inner.update(
            chat_id,
            UpdateChatRequest {
                last_message_id: Some(message.id.clone()),
                last_message_at: Some(message.created_at),
                ..Default::default()
            },
        )
    }

    /// Chats a user actively belongs to, most recently active first.
    pub fn find_by_user(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        let chat_ids = self.members.chat_ids_for_user(user_id)?;
        let options = Self::scoped_to(chat_ids, &FindOptions::default());
        self.inner.find_all(&FindOptions {
            order_by: Some(Chat::CURSOR_FIELD.to_string()),
            order_direction: Some(OrderDirection::Desc),
            ..options
        })
    }

    /// One page of the chats a user actively belongs to, narrowed further by
    /// the filters in `filters`.
    pub fn get_user_chats_paginated(
        &self,
        user_id: &str,
        params: &PaginationParams,
        filters: &FindOptions,
    ) -> Result<PaginatedResult<Chat>, RepositoryError> {
        params.validate()?;
        let chat_ids = self.members.chat_ids_for_user(user_id)?;
        self.inner.paginate(&Self::scoped_to(chat_ids, filters), params)
    }

    fn scoped_to(chat_ids: Vec<String>, filters: &FindOptions) -> FindOptions {
        let mut options = filters.clone();
        options
            .conditional_filters
            .push(ConditionalFilter::new("id", FilterOperator::In, chat_ids));
        options
    }
}

impl<S: EntityStore<Chat>> ChatRepository<S> {
    fn create_record(&self, request: CreateChatRequest) -> Result<Chat, RepositoryError> {
        self.inner.insert(|meta| Chat::from_request(meta, request))
    }
}

delegate_repository!(ChatRepository, Chat, CreateChatRequest);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryBuilder;
    use crate::repository::Repository;
    use crate::repository::test_store::TestStore;
    use chatstore_types::error::PaginationError;
    use chatstore_types::message::CreateMessageRequest;
    use chatstore_types::record::RecordMeta;

    fn repo() -> ChatRepository<TestStore> {
        ChatRepository::new(Arc::new(TestStore::default()), PaginationConfig::default())
    }

    fn open(kind: ChatType, name: &str, created_by: &str) -> CreateChatRequest {
        CreateChatRequest {
            name: Some(name.to_string()),
            chat_type: Some(kind),
            description: None,
            created_by: created_by.to_string(),
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn message_in(chat: &Chat) -> Message {
        Message::from_request(
            RecordMeta::new("m-1".to_string(), TestStore::at(100)),
            CreateMessageRequest {
                chat_id: chat.id.clone(),
                sender_id: chat.created_by.clone(),
                content: "hey".to_string(),
                message_type: None,
                reply_to_id: None,
            },
        )
    }

    #[tokio::test]
    async fn test_create_with_members_adds_owner() {
        let repo = repo();
        let chat = repo
            .create_with_members(open(ChatType::Group, "team", "u1"), &ids(&["u2", "u1", "u2"]))
            .unwrap();

        let members = repo.members().find_by_chat(&chat.id).unwrap();
        assert_eq!(members.len(), 2);
        let owner = repo.members().find_membership(&chat.id, "u1").unwrap().unwrap();
        assert_eq!(owner.role, MemberRole::Owner);
        assert_eq!(repo.find_by_id(&chat.id).await.unwrap(), Some(chat.clone()));
    }

    #[tokio::test]
    async fn test_find_direct_chat() {
        let repo = repo();
        repo.create_with_members(open(ChatType::Group, "trio", "u1"), &ids(&["u2", "u3"]))
            .unwrap();
        let direct = repo
            .create_with_members(open(ChatType::Direct, "dm", "u1"), &ids(&["u2"]))
            .unwrap();

        let found = repo.find_direct_chat("u2", "u1").unwrap();
        assert_eq!(found.map(|c| c.id), Some(direct.id.clone()));
        assert!(repo.find_direct_chat("u1", "u3").unwrap().is_none());

        repo.members().remove_member(&direct.id, "u2").unwrap();
        assert!(repo.find_direct_chat("u1", "u2").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_touch_last_message_moves_updated_at() {
        let repo = repo();
        let chat = repo.create(open(ChatType::Direct, "dm", "u1")).await.unwrap();
        let message = message_in(&chat);

        let touched = repo.touch_last_message(&chat.id, &message).unwrap().unwrap();
        assert_eq!(touched.last_message_id.as_deref(), Some("m-1"));
        assert_eq!(touched.last_message_at, Some(message.created_at));
        assert!(touched.updated_at > chat.updated_at);
        assert!(repo.touch_last_message("missing", &message).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_chats_page_joins_memberships() {
        let repo = repo();
        let a = repo
            .create_with_members(open(ChatType::Group, "a", "u1"), &[])
            .unwrap();
        let b = repo
            .create_with_members(open(ChatType::Group, "b", "u2"), &ids(&["u1"]))
            .unwrap();
        let c = repo
            .create_with_members(open(ChatType::Direct, "c", "u1"), &ids(&["u3"]))
            .unwrap();
        repo.create_with_members(open(ChatType::Group, "other", "u2"), &[])
            .unwrap();

        // Activity in `a` makes it the most recently updated chat.
        repo.touch_last_message(&a.id, &message_in(&a)).unwrap();

        let page = repo
            .get_user_chats_paginated(
                "u1",
                &PaginationParams::forward(10),
                &FindOptions::default(),
            )
            .unwrap();
        let names: Vec<_> = page.items.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert_eq!(page.total_count, 3);

        let groups_only = QueryBuilder::new().where_equals("chatType", "group").build();
        let page = repo
            .get_user_chats_paginated("u1", &PaginationParams::backward(1), &groups_only)
            .unwrap();
        assert_eq!(page.items[0].id, a.id);
        assert_eq!(page.total_count, 2);
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);

        let recent = repo.find_by_user("u1").unwrap();
        assert_eq!(recent.first().map(|c| c.id.clone()), Some(a.id));
        assert!(recent.iter().any(|chat| chat.id == b.id));
        assert!(recent.iter().any(|chat| chat.id == c.id));
    }

    #[tokio::test]
    async fn test_user_chats_rejects_bad_params_before_lookup() {
        let repo = repo();
        let both = PaginationParams::forward(1).after("x").before("y");
        let err = repo
            .get_user_chats_paginated("u1", &both, &FindOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Pagination(PaginationError::InvalidArgs(_))
        ));
    }
}
