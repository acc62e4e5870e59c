//! Infrastructure layer for chatstore.
//!
//! Contains the in-memory implementation of the `EntityStore` port defined in
//! `chatstore-core`, the `config.toml` loader, and the `Repositories` bundle
//! that wires every repository to one shared store.

pub mod config;
pub mod memory;
pub mod repositories;

pub use memory::MemoryStore;
pub use repositories::Repositories;
