//! Shared domain types for chatstore.
//!
//! This crate contains the records held by the entity store (User, Chat,
//! ChatMember, Message), the request types used to create and patch them,
//! the `Entity` trait every record implements, and the error and
//! configuration types shared across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod message;
pub mod record;
pub mod user;
