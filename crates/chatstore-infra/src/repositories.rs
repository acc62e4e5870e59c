//! Repository bundle over one shared [`MemoryStore`].
//!
//! Upstream layers (resolvers, controllers, seeders) build a single
//! `Repositories` at startup and pass it around; every repository in it
//! reads and writes the same store.

use std::sync::Arc;

use chatstore_core::repository::{
    ChatMemberRepository, ChatRepository, MessageRepository, Repository, UserRepository,
};
use chatstore_core::store::EntityStore;
use chatstore_types::chat::{Chat, ChatMember};
use chatstore_types::config::StoreConfig;
use chatstore_types::error::RepositoryError;
use chatstore_types::message::{CreateMessageRequest, Message};
use chatstore_types::user::User;

use crate::memory::MemoryStore;

pub struct Repositories {
    store: Arc<MemoryStore>,
    pub users: UserRepository<MemoryStore>,
    pub chats: ChatRepository<MemoryStore>,
    pub members: ChatMemberRepository<MemoryStore>,
    pub messages: MessageRepository<MemoryStore>,
}

impl Repositories {
    pub fn new(store: Arc<MemoryStore>, config: &StoreConfig) -> Self {
        let pagination = config.pagination;
        Self {
            users: UserRepository::new(Arc::clone(&store), pagination),
            chats: ChatRepository::new(Arc::clone(&store), pagination),
            members: ChatMemberRepository::new(Arc::clone(&store), pagination),
            messages: MessageRepository::new(Arc::clone(&store), pagination),
            store,
        }
    }

    /// Repositories over a fresh, empty store.
    pub fn in_memory(config: &StoreConfig) -> Self {
        Self::new(MemoryStore::shared(), config)
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Create a message and record it as its chat's latest.
    ///
    /// The two writes are not atomic. A message whose chat does not exist is
    /// still stored; the miss is logged.
    pub async fn post_message(
        &self,
        request: CreateMessageRequest,
    ) -> Result<Message, RepositoryError> {
        let message = self.messages.create(request).await?;
        if self
            .chats
            .touch_last_message(&message.chat_id, &message)?
            .is_none()
        {
            tracing::warn!(
                chat_id = %message.chat_id,
                message_id = %message.id,
                "message posted to unknown chat"
            );
        }
        Ok(message)
    }

    /// Empty every collection. Used by seeding.
    pub fn clear_all(&self) -> Result<(), RepositoryError> {
        EntityStore::<Message>::clear(self.store.as_ref())?;
        EntityStore::<ChatMember>::clear(self.store.as_ref())?;
        EntityStore::<Chat>::clear(self.store.as_ref())?;
        EntityStore::<User>::clear(self.store.as_ref())?;
        tracing::info!("all collections cleared");
        Ok(())
    }
}
