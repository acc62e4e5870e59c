//! Pagination arguments.
//!
//! [`ConnectionArgs`] are the relay arguments an upstream resolver receives
//! (`first`/`after`/`last`/`before`). [`PaginationParams`] is the resolved
//! form the repositories take: one page size, at most one cursor and an
//! explicit direction.

use chatstore_types::config::PaginationConfig;
use chatstore_types::error::PaginationError;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cursor::{CursorKey, decode_cursor};

/// Which end of the ordered result set a page is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    /// Oldest first, continuing after a cursor.
    #[default]
    Forward,
    /// Newest first, continuing before a cursor. Pages are still returned
    /// in ascending display order.
    Backward,
}

impl fmt::Display for PageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageDirection::Forward => write!(f, "forward"),
            PageDirection::Backward => write!(f, "backward"),
        }
    }
}

/// Relay connection arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionArgs {
    pub first: Option<usize>,
    pub after: Option<String>,
    pub last: Option<usize>,
    pub before: Option<String>,
}

impl ConnectionArgs {
    pub fn first(n: usize) -> Self {
        Self {
            first: Some(n),
            ..Default::default()
        }
    }

    pub fn last(n: usize) -> Self {
        Self {
            last: Some(n),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Validate the argument combination and resolve the page size.
    ///
    /// `first` together with `last`, or `after` together with `before`, is
    /// rejected. The page size defaults to `default_page_size` and is capped
    /// at `max_page_size`. A request is backward when `last` is given, or
    /// when only a `before` cursor is.
    pub fn to_params(
        &self,
        config: &PaginationConfig,
    ) -> Result<PaginationParams, PaginationError> {
        if self.first.is_some() && self.last.is_some() {
            tracing::warn!("rejected pagination arguments: both first and last");
            return Err(PaginationError::InvalidArgs(
                "`first` and `last` cannot be combined".to_string(),
            ));
        }
        if self.after.is_some() && self.before.is_some() {
            tracing::warn!("rejected pagination arguments: both after and before");
            return Err(PaginationError::InvalidArgs(
                "`after` and `before` cannot be combined".to_string(),
            ));
        }

        let direction = if self.last.is_some() || (self.first.is_none() && self.before.is_some()) {
            PageDirection::Backward
        } else {
            PageDirection::Forward
        };
        let limit = self
            .first
            .or(self.last)
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size);

        Ok(PaginationParams {
            limit,
            after_cursor: self.after.clone(),
            before_cursor: self.before.clone(),
            direction,
        })
    }
}

/// Resolved pagination request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub limit: usize,
    #[serde(default)]
    pub after_cursor: Option<String>,
    #[serde(default)]
    pub before_cursor: Option<String>,
    #[serde(default)]
    pub direction: PageDirection,
}

impl PaginationParams {
    pub fn forward(limit: usize) -> Self {
        Self {
            limit,
            after_cursor: None,
            before_cursor: None,
            direction: PageDirection::Forward,
        }
    }

    pub fn backward(limit: usize) -> Self {
        Self {
            direction: PageDirection::Backward,
            ..Self::forward(limit)
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after_cursor = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before_cursor = Some(cursor.into());
        self
    }

    /// Cap the page size at the configured maximum.
    pub fn clamped(mut self, config: &PaginationConfig) -> Self {
        self.limit = self.limit.min(config.max_page_size);
        self
    }

    /// Check the cursor combination and decode the cursors.
    ///
    /// Returns the `(after, before)` bounds. Fails before any record is
    /// looked at.
    pub fn validate(&self) -> Result<(Option<CursorKey>, Option<CursorKey>), PaginationError> {
        if self.after_cursor.is_some() && self.before_cursor.is_some() {
            tracing::warn!("rejected pagination params: both after and before cursors");
            return Err(PaginationError::InvalidArgs(
                "`after` and `before` cannot be combined".to_string(),
            ));
        }
        let decode = |cursor: &Option<String>| {
            cursor
                .as_deref()
                .map(decode_cursor)
                .transpose()
                .inspect_err(|err| tracing::warn!(error = %err, "rejected pagination cursor"))
        };
        Ok((decode(&self.after_cursor)?, decode(&self.before_cursor)?))
    }
}
