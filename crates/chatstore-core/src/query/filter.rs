//! Conditional filter evaluation.
//!
//! A [`ConditionalFilter`] is a single typed predicate `(key, operator, value)`
//! applied to the JSON document view of a record. Evaluation is a pure
//! function of the document and the condition. A list of conditions is
//! combined with logical AND.
//!
//! Operators:
//! - Eq, Ne (strict equality / inequality)
//! - Gt, Gte, Lt, Lte (numeric, RFC 3339 date, or lexical string ordering)
//! - In, Nin (list membership)
//! - Like, Nlike (SQL pattern: `%` any run, `_` any single char; anchored, case-insensitive)
//! - Contains (array element membership, or case-insensitive substring)
//! - StartsWith, EndsWith (case-insensitive, strings only)
//! - IsNull, IsNotNull (absent or null)

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chatstore_types::error::FilterParseError;
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Like,
    Nlike,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    /// External name of the operator (e.g. "startsWith").
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::Nin => "nin",
            FilterOperator::Like => "like",
            FilterOperator::Nlike => "nlike",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::IsNull => "isNull",
            FilterOperator::IsNotNull => "isNotNull",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eq" => Ok(FilterOperator::Eq),
            "ne" => Ok(FilterOperator::Ne),
            "gt" => Ok(FilterOperator::Gt),
            "gte" => Ok(FilterOperator::Gte),
            "lt" => Ok(FilterOperator::Lt),
            "lte" => Ok(FilterOperator::Lte),
            "in" => Ok(FilterOperator::In),
            "nin" => Ok(FilterOperator::Nin),
            "like" => Ok(FilterOperator::Like),
            "nlike" => Ok(FilterOperator::Nlike),
            "contains" => Ok(FilterOperator::Contains),
            "startswith" => Ok(FilterOperator::StartsWith),
            "endswith" => Ok(FilterOperator::EndsWith),
            "isnull" => Ok(FilterOperator::IsNull),
            "isnotnull" => Ok(FilterOperator::IsNotNull),
            _ => Err(FilterParseError::UnknownOperator(s.to_string())),
        }
    }
}

/// A single predicate applied during a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalFilter {
    /// Document field name. Dotted paths reach into nested objects.
    pub key: String,
    pub operator: FilterOperator,
    /// Operand. Ignored by `isNull`/`isNotNull`.
    #[serde(default)]
    pub value: Value,
}

impl ConditionalFilter {
    pub fn new(key: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate this condition against a record document.
    pub fn matches(&self, document: &Value) -> bool {
        matches(document, self)
    }

    /// Prepare this condition for evaluation against many documents.
    pub fn compile(&self) -> CompiledFilter<'_> {
        let pattern = match self.operator {
            FilterOperator::Like | FilterOperator::Nlike => {
                self.value.as_str().and_then(like_regex)
            }
            _ => None,
        };
        CompiledFilter {
            condition: self,
            pattern,
        }
    }
}

/// A condition with its LIKE pattern compiled once.
#[derive(Debug, Clone)]
pub struct CompiledFilter<'a> {
    condition: &'a ConditionalFilter,
    pattern: Option<Regex>,
}

impl CompiledFilter<'_> {
    pub fn condition(&self) -> &ConditionalFilter {
        self.condition
    }

    pub fn matches(&self, document: &Value) -> bool {
        evaluate(document, self.condition, self.pattern.as_ref())
    }
}

/// Decide whether `document` satisfies `condition`.
pub fn matches(document: &Value, condition: &ConditionalFilter) -> bool {
    condition.compile().matches(document)
}

fn evaluate(document: &Value, condition: &ConditionalFilter, pattern: Option<&Regex>) -> bool {
    let field = field_value(document, &condition.key);
    let operand = &condition.value;

    match condition.operator {
        FilterOperator::Eq => values_equal(field, operand),
        FilterOperator::Ne => !values_equal(field, operand),
        FilterOperator::Gt => compare_values(field, operand) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(
            compare_values(field, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lt => compare_values(field, operand) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(
            compare_values(field, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::In => is_member(field, operand),
        FilterOperator::Nin => !is_member(field, operand),
        FilterOperator::Like => like(field, pattern),
        FilterOperator::Nlike => !like(field, pattern),
        FilterOperator::Contains => contains(field, operand),
        FilterOperator::StartsWith => match (field.as_str(), operand.as_str()) {
            (Some(f), Some(p)) => f.to_lowercase().starts_with(&p.to_lowercase()),
            _ => false,
        },
        FilterOperator::EndsWith => match (field.as_str(), operand.as_str()) {
            (Some(f), Some(s)) => f.to_lowercase().ends_with(&s.to_lowercase()),
            _ => false,
        },
        FilterOperator::IsNull => field.is_null(),
        FilterOperator::IsNotNull => !field.is_null(),
    }
}

/// Decide whether `document` satisfies every condition (logical AND).
pub fn matches_all(document: &Value, conditions: &[ConditionalFilter]) -> bool {
    conditions.iter().all(|condition| matches(document, condition))
}

// ---------------------------------------------------------------------------
// Value helpers (shared with sorting)
// ---------------------------------------------------------------------------

static NULL: Value = Value::Null;

/// Look up a field, walking dotted paths. Absent fields read as null.
pub(crate) fn field_value<'a>(document: &'a Value, key: &str) -> &'a Value {
    if let Some(value) = document.get(key) {
        return value;
    }
    key.split('.')
        .try_fold(document, |current, part| current.get(part))
        .unwrap_or(&NULL)
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// Strict equality. Numbers compare by value, RFC 3339 strings by instant.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => {
            x == y
                || matches!(
                    (parse_timestamp(x), parse_timestamp(y)),
                    (Some(dx), Some(dy)) if dx == dy
                )
        }
        _ => a == b,
    }
}

/// Ordered comparison. `None` when the two values are not comparable
/// (different kinds, null, arrays, objects).
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(dx), Some(dy)) => Some(dx.cmp(&dy)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total sort key for one field value.
///
/// Kinds rank `null < bool < number < timestamp < text < array/object`.
/// Strings that parse as RFC 3339 order by instant among themselves and
/// before every other string, so mixed text columns still sort
/// consistently.
#[derive(Debug, Clone)]
pub(crate) enum SortKey {
    Null,
    Bool(bool),
    Number(f64),
    Timestamp(DateTime<FixedOffset>),
    Text(String),
    Composite,
}

impl SortKey {
    pub(crate) fn of(value: &Value) -> Self {
        match value {
            Value::Null => SortKey::Null,
            Value::Bool(b) => SortKey::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(SortKey::Composite, SortKey::Number),
            Value::String(s) => match parse_timestamp(s) {
                Some(at) => SortKey::Timestamp(at),
                None => SortKey::Text(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => SortKey::Composite,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Bool(_) => 1,
            SortKey::Number(_) => 2,
            SortKey::Timestamp(_) => 3,
            SortKey::Text(_) => 4,
            SortKey::Composite => 5,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

fn is_member(field: &Value, operand: &Value) -> bool {
    match operand {
        Value::Array(items) => items.iter().any(|item| values_equal(field, item)),
        single => values_equal(field, single),
    }
}

fn contains(field: &Value, operand: &Value) -> bool {
    match field {
        Value::Array(items) => items.iter().any(|item| values_equal(item, operand)),
        Value::String(haystack) => match operand.as_str() {
            Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
            None => false,
        },
        _ => false,
    }
}

fn like(field: &Value, pattern: Option<&Regex>) -> bool {
    let Some(re) = pattern else {
        return false;
    };
    match field {
        Value::String(s) => re.is_match(s),
        Value::Number(n) => re.is_match(&n.to_string()),
        Value::Bool(b) => re.is_match(&b.to_string()),
        _ => false,
    }
}

/// Translate a SQL LIKE pattern into an anchored, case-insensitive regex.
pub(crate) fn like_regex(pattern: &str) -> Option<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push_str("(?is)^");
    let mut buf = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    re.push('$');
    Regex::new(&re).ok()
}
