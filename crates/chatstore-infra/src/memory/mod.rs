//! In-memory storage layer.
//!
//! Implements the `EntityStore` port from `chatstore-core` with one
//! lock-protected collection per entity type.

pub mod store;

pub use store::MemoryStore;
