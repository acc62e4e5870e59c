//! Query descriptor and its evaluation over a collection snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chatstore_types::error::FilterParseError;
use chatstore_types::record::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::{CompiledFilter, ConditionalFilter, SortKey, field_value, values_equal};

/// Sort direction for `orderBy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending order (A-Z, 1-9, oldest-newest)
    #[default]
    #[serde(alias = "ascending", alias = "ASC")]
    Asc,
    /// Descending order (Z-A, 9-1, newest-oldest)
    #[serde(alias = "descending", alias = "DESC")]
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "asc"),
            OrderDirection::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for OrderDirection {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(OrderDirection::Asc),
            "desc" | "descending" => Ok(OrderDirection::Desc),
            _ => Err(FilterParseError::UnknownDirection(s.to_string())),
        }
    }
}

/// Immutable query descriptor produced by `QueryBuilder::build`.
///
/// Every field is optional. Without `order_by` results keep the store's
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindOptions {
    /// Exact-match map: every key must equal its value.
    pub filter: Option<BTreeMap<String, Value>>,
    /// Conditions combined with AND.
    pub conditional_filters: Vec<ConditionalFilter>,
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl FindOptions {
    /// Whether a record document passes the exact-match map and every
    /// conditional filter.
    pub fn matches(&self, document: &Value) -> bool {
        self.matcher().matches(document)
    }

    /// Records that pass the filters, in their original order.
    pub fn filter_records<E: Entity>(&self, records: Vec<E>) -> Vec<E> {
        let matcher = self.matcher();
        records
            .into_iter()
            .filter(|record| matcher.matches(&record.to_document()))
            .collect()
    }

    /// Run the full pipeline: filter, stable sort, then offset and limit.
    ///
    /// Sorting ranks nulls first ascending, then booleans,
    /// numbers, timestamps and plain text.
    pub fn apply<E: Entity>(&self, records: Vec<E>) -> Vec<E> {
        let matcher = self.matcher();
        let mut rows: Vec<(SortKey, E)> = records
            .into_iter()
            .filter_map(|record| {
                let document = record.to_document();
                if !matcher.matches(&document) {
                    return None;
                }
                let key = match self.order_by.as_deref() {
                    Some(field) => SortKey::of(field_value(&document, field)),
                    None => SortKey::Null,
                };
                Some((key, record))
            })
            .collect();

        if self.order_by.is_some() {
            match self.order_direction.unwrap_or_default() {
                OrderDirection::Asc => rows.sort_by(|(a, _), (b, _)| a.cmp(b)),
                OrderDirection::Desc => rows.sort_by(|(a, _), (b, _)| b.cmp(a)),
            }
        }

        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        rows.into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, record)| record)
            .collect()
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            exact: self.filter.as_ref(),
            conditions: self
                .conditional_filters
                .iter()
                .map(ConditionalFilter::compile)
                .collect(),
        }
    }
}

/// Filters of one `FindOptions`, compiled once per query.
struct Matcher<'a> {
    exact: Option<&'a BTreeMap<String, Value>>,
    conditions: Vec<CompiledFilter<'a>>,
}

impl Matcher<'_> {
    fn matches(&self, document: &Value) -> bool {
        let exact = self.exact.is_none_or(|filter| {
            filter
                .iter()
                .all(|(key, expected)| values_equal(field_value(document, key), expected))
        });
        exact && self.conditions.iter().all(|condition| condition.matches(document))
    }
}
