//! Fluent query builder.
//!
//! Accumulates conditions, ordering and paging into a [`FindOptions`]
//! snapshot. A builder is consumed by `build`, so each call site constructs
//! its own instance and one builder never serves two queries.
//!
//! ```
//! use chatstore_core::query::{OrderDirection, QueryBuilder};
//!
//! let options = QueryBuilder::new()
//!     .where_equals("chatId", "c1")
//!     .where_contains("content", "hello")
//!     .order_by("createdAt", OrderDirection::Desc)
//!     .limit(20)
//!     .build();
//! assert_eq!(options.conditional_filters.len(), 2);
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use super::filter::{ConditionalFilter, FilterOperator};
use super::options::{FindOptions, OrderDirection};

/// Mutable accumulator for a single query.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    filter: Option<BTreeMap<String, Value>>,
    conditions: Vec<ConditionalFilter>,
    order_by: Option<String>,
    order_direction: Option<OrderDirection>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        self.conditions.push(ConditionalFilter::new(key, operator, value));
        self
    }

    /// Add a prebuilt condition.
    pub fn where_condition(mut self, condition: ConditionalFilter) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn where_equals(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, FilterOperator::Eq, value.into())
    }

    pub fn where_not_equals(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, FilterOperator::Ne, value.into())
    }

    pub fn where_greater_than(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, FilterOperator::Gt, value.into())
    }

    pub fn where_greater_than_or_equal(
        self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.push(key, FilterOperator::Gte, value.into())
    }

    pub fn where_less_than(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, FilterOperator::Lt, value.into())
    }

    pub fn where_less_than_or_equal(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, FilterOperator::Lte, value.into())
    }

    pub fn where_in<V>(self, key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.push(key, FilterOperator::In, Value::Array(list))
    }

    pub fn where_not_in<V>(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.push(key, FilterOperator::Nin, Value::Array(list))
    }

    /// SQL-style pattern: `%` matches any run, `_` any single character.
    pub fn where_like(self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.push(key, FilterOperator::Like, Value::String(pattern.into()))
    }

    pub fn where_not_like(self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.push(key, FilterOperator::Nlike, Value::String(pattern.into()))
    }

    /// Substring (strings, case-insensitive) or element (arrays) test.
    pub fn where_contains(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, FilterOperator::Contains, value.into())
    }

    pub fn where_starts_with(self, key: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.push(key, FilterOperator::StartsWith, Value::String(prefix.into()))
    }

    pub fn where_ends_with(self, key: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.push(key, FilterOperator::EndsWith, Value::String(suffix.into()))
    }

    pub fn where_null(self, key: impl Into<String>) -> Self {
        self.push(key, FilterOperator::IsNull, Value::Null)
    }

    pub fn where_not_null(self, key: impl Into<String>) -> Self {
        self.push(key, FilterOperator::IsNotNull, Value::Null)
    }

    /// Legacy exact-match map. Merged with any earlier map; later keys win.
    pub fn filter<K, V>(mut self, map: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let filter = self.filter.get_or_insert_with(BTreeMap::new);
        for (key, value) in map {
            filter.insert(key.into(), value.into());
        }
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(field.into());
        self.order_direction = Some(direction);
        self
    }

    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.order_by(field, OrderDirection::Desc)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Snapshot the accumulated query.
    pub fn build(self) -> FindOptions {
        FindOptions {
            filter: self.filter,
            conditional_filters: self.conditions,
            order_by: self.order_by,
            order_direction: self.order_direction,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
