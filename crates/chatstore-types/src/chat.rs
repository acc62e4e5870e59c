//! Chat and chat membership records.
//!
//! A chat is either a direct conversation between two users or a named
//! group. Who belongs to a chat is modeled by separate `ChatMember`
//! records so membership can be queried from either side (members of a
//! chat, chats of a member).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::record::{Entity, RecordMeta, patch_field};

/// Kind of conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    #[default]
    Direct,
    Group,
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatType::Direct => write!(f, "direct"),
            ChatType::Group => write!(f, "group"),
        }
    }
}

impl FromStr for ChatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(ChatType::Direct),
            "group" => Ok(ChatType::Group),
            other => Err(format!("invalid chat type: '{other}'")),
        }
    }
}

/// Role of a member within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Owner => write!(f, "owner"),
            MemberRole::Admin => write!(f, "admin"),
            MemberRole::Member => write!(f, "member"),
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(MemberRole::Owner),
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            other => Err(format!("invalid member role: '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A conversation. Chat lists are ordered by `updatedAt`, which moves
/// forward every time a message is posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub name: Option<String>,
    pub chat_type: ChatType,
    pub description: Option<String>,
    pub created_by: String,
    pub last_message_id: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn from_request(meta: RecordMeta, request: CreateChatRequest) -> Self {
        Self {
            id: meta.id,
            name: request.name,
            chat_type: request.chat_type.unwrap_or_default(),
            description: request.description,
            created_by: request.created_by,
            last_message_id: None,
            last_message_at: None,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Request to open a new chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chat_type: Option<ChatType>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by: String,
}

/// Partial update of a chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateChatRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub last_message_id: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Entity for Chat {
    const COLLECTION: &'static str = "chats";
    const CURSOR_FIELD: &'static str = "updatedAt";

    type Patch = UpdateChatRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn cursor_timestamp(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn apply_patch(&mut self, patch: UpdateChatRequest) {
        if patch.name.is_some() {
            self.name = patch.name;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if patch.last_message_id.is_some() {
            self.last_message_id = patch.last_message_id;
        }
        if patch.last_message_at.is_some() {
            self.last_message_at = patch.last_message_at;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// ChatMember
// ---------------------------------------------------------------------------

/// Membership of one user in one chat.
///
/// Leaving a chat is a soft delete: `isActive` flips to false and `leftAt`
/// is stamped, so history of who was in a chat is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMember {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatMember {
    /// Build a membership. Role defaults to `member`, `isActive` to true.
    pub fn from_request(meta: RecordMeta, request: AddMemberRequest) -> Self {
        Self {
            id: meta.id,
            chat_id: request.chat_id,
            user_id: request.user_id,
            role: request.role.unwrap_or_default(),
            is_active: request.is_active.unwrap_or(true),
            joined_at: meta.created_at,
            left_at: None,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Request to add a user to a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub chat_id: String,
    pub user_id: String,
    #[serde(default)]
    pub role: Option<MemberRole>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial update of a membership.
///
/// `left_at: Some(None)` clears the leave stamp (used when re-joining).
#[derive(Debug, Clone, Default)]
pub struct UpdateMemberRequest {
    pub role: Option<MemberRole>,
    pub is_active: Option<bool>,
    pub joined_at: Option<DateTime<Utc>>,
    pub left_at: Option<Option<DateTime<Utc>>>,
}

impl Entity for ChatMember {
    const COLLECTION: &'static str = "chat_members";
    const CURSOR_FIELD: &'static str = "createdAt";

    type Patch = UpdateMemberRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn cursor_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn apply_patch(&mut self, patch: UpdateMemberRequest) {
        patch_field(&mut self.role, patch.role);
        patch_field(&mut self.is_active, patch.is_active);
        patch_field(&mut self.joined_at, patch.joined_at);
        patch_field(&mut self.left_at, patch.left_at);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
