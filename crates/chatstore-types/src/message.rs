//! Chat message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::record::{Entity, RecordMeta, patch_field};

/// Payload kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    System,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Text => write!(f, "text"),
            MessageType::Image => write!(f, "image"),
            MessageType::File => write!(f, "file"),
            MessageType::System => write!(f, "system"),
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageType::Text),
            "image" => Ok(MessageType::Image),
            "file" => Ok(MessageType::File),
            "system" => Ok(MessageType::System),
            other => Err(format!("invalid message type: '{other}'")),
        }
    }
}

/// A single message posted to a chat. Histories are ordered by `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub reply_to_id: Option<String>,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn from_request(meta: RecordMeta, request: CreateMessageRequest) -> Self {
        Self {
            id: meta.id,
            chat_id: request.chat_id,
            sender_id: request.sender_id,
            content: request.content,
            message_type: request.message_type.unwrap_or_default(),
            reply_to_id: request.reply_to_id,
            is_edited: false,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Request to post a message. `type` defaults to `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub chat_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default, rename = "type")]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    pub reply_to_id: Option<String>,
}

/// Partial update of a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateMessageRequest {
    pub content: Option<String>,
    pub is_edited: Option<bool>,
}

impl Entity for Message {
    const COLLECTION: &'static str = "messages";
    const CURSOR_FIELD: &'static str = "createdAt";

    type Patch = UpdateMessageRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn cursor_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn apply_patch(&mut self, patch: UpdateMessageRequest) {
        patch_field(&mut self.content, patch.content);
        patch_field(&mut self.is_edited, patch.is_edited);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            chat_id: "c1".to_string(),
            sender_id: "u1".to_string(),
            content: content.to_string(),
            message_type: None,
            reply_to_id: None,
        }
    }

    #[test]
    fn test_message_type_defaults_to_text() {
        let meta = RecordMeta::new("m1".to_string(), Utc::now());
        let msg = Message::from_request(meta, request("hi"));
        assert_eq!(msg.message_type, MessageType::Text);
        assert!(!msg.is_edited);
    }

    #[test]
    fn test_message_document_renames_type() {
        let meta = RecordMeta::new("m1".to_string(), Utc::now());
        let msg = Message::from_request(meta, request("hi"));
        let doc = msg.to_document();
        assert_eq!(doc["type"], "text");
        assert_eq!(doc["chatId"], "c1");
        assert!(doc.get("messageType").is_none());
    }

    #[test]
    fn test_create_request_deserializes_without_type() {
        let req: CreateMessageRequest = serde_json::from_str(
            r#"{"chatId": "c1", "senderId": "u1", "content": "hello"}"#,
        )
        .unwrap();
        assert!(req.message_type.is_none());

        let req: CreateMessageRequest = serde_json::from_str(
            r#"{"chatId": "c1", "senderId": "u1", "content": "pic", "type": "image"}"#,
        )
        .unwrap();
        assert_eq!(req.message_type, Some(MessageType::Image));
    }

    #[test]
    fn test_apply_patch_edits_content() {
        let meta = RecordMeta::new("m1".to_string(), Utc::now());
        let mut msg = Message::from_request(meta, request("hi"));
        msg.apply_patch(UpdateMessageRequest {
            content: Some("hello".to_string()),
            is_edited: Some(true),
        });
        assert_eq!(msg.content, "hello");
        assert!(msg.is_edited);
        assert_eq!(msg.id, "m1");
    }
}
