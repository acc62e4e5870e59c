//! User records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::record::{Entity, RecordMeta, patch_field};

/// Presence status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    #[default]
    Offline,
    Away,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Online => write!(f, "online"),
            UserStatus::Offline => write!(f, "offline"),
            UserStatus::Away => write!(f, "away"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(UserStatus::Online),
            "offline" => Ok(UserStatus::Offline),
            "away" => Ok(UserStatus::Away),
            other => Err(format!("invalid user status: '{other}'")),
        }
    }
}

/// A registered chat participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: UserStatus,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user from store-assigned metadata and a create request.
    pub fn from_request(meta: RecordMeta, request: CreateUserRequest) -> Self {
        Self {
            id: meta.id,
            username: request.username,
            email: request.email,
            display_name: request.display_name,
            avatar_url: request.avatar_url,
            status: UserStatus::default(),
            last_seen_at: None,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Request to register a user. Credentials are handled upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Partial update of a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: Option<UserStatus>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const CURSOR_FIELD: &'static str = "createdAt";

    type Patch = UpdateUserRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn cursor_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn apply_patch(&mut self, patch: UpdateUserRequest) {
        patch_field(&mut self.username, patch.username);
        patch_field(&mut self.email, patch.email);
        patch_field(&mut self.status, patch.status);
        if patch.display_name.is_some() {
            self.display_name = patch.display_name;
        }
        if patch.avatar_url.is_some() {
            self.avatar_url = patch.avatar_url;
        }
        if patch.last_seen_at.is_some() {
            self.last_seen_at = patch.last_seen_at;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::from_request(
            RecordMeta::new("u1".to_string(), Utc::now()),
            CreateUserRequest {
                username: "luna".to_string(),
                email: "luna@example.com".to_string(),
                display_name: None,
                avatar_url: None,
            },
        )
    }

    #[test]
    fn test_user_status_display_and_parse() {
        for status in [UserStatus::Online, UserStatus::Offline, UserStatus::Away] {
            let parsed: UserStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("busy".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_new_user_defaults_offline() {
        let user = sample_user();
        assert_eq!(user.status, UserStatus::Offline);
        assert!(user.last_seen_at.is_none());
    }

    #[test]
    fn test_user_document_uses_camel_case() {
        let doc = sample_user().to_document();
        assert_eq!(doc["username"], "luna");
        assert!(doc.get("createdAt").is_some());
        assert!(doc.get("displayName").is_some());
        assert_eq!(doc["status"], "offline");
    }

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let mut user = sample_user();
        user.apply_patch(UpdateUserRequest {
            display_name: Some("Luna".to_string()),
            status: Some(UserStatus::Online),
            ..Default::default()
        });
        assert_eq!(user.username, "luna");
        assert_eq!(user.display_name.as_deref(), Some("Luna"));
        assert_eq!(user.status, UserStatus::Online);
    }
}
