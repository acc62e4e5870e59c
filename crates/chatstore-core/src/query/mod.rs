//! In-memory query evaluation: filter operators, the query builder and the
//! `FindOptions` pipeline.

pub mod builder;
pub mod filter;
pub mod options;

pub use builder::QueryBuilder;
pub use filter::{CompiledFilter, ConditionalFilter, FilterOperator, matches, matches_all};
pub use options::{FindOptions, OrderDirection};
