//! Query engine, cursor pagination and repository definitions for chatstore.
//!
//! This crate defines the `EntityStore` port that the infrastructure layer
//! implements, plus everything that can be written against it without
//! knowing how records are held: the filter evaluator, the query builder,
//! the cursor codec, the pagination engine and the per-entity repositories.
//! Among workspace crates it depends on `chatstore-types` and
//! `chatstore-observe` -- never on `chatstore-infra`.

pub mod pagination;
pub mod query;
pub mod repository;
pub mod store;
