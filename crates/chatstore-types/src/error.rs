use thiserror::Error;

/// Errors decoding an opaque pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("cursor is not valid base64")]
    Encoding,

    #[error("cursor does not decode to UTF-8 text")]
    NotUtf8,

    #[error("cursor is missing the timestamp/id separator")]
    MissingSeparator,

    #[error("cursor timestamp '{0}' is not ISO-8601")]
    InvalidTimestamp(String),

    #[error("cursor carries an empty id")]
    EmptyId,
}

/// Errors rejecting pagination input before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("invalid pagination arguments: {0}")]
    InvalidArgs(String),

    #[error("malformed cursor: {0}")]
    MalformedCursor(#[from] CursorError),
}

/// Error parsing a filter operator name that arrived as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    #[error("unknown filter operator: '{0}'")]
    UnknownOperator(String),

    #[error("unknown sort direction: '{0}'")]
    UnknownDirection(String),
}

/// Errors from repository and store operations.
///
/// A missing record is not an error: lookups return `Option`, deletes
/// return `bool`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("collection '{0}' lock poisoned")]
    LockPoisoned(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl From<CursorError> for RepositoryError {
    fn from(err: CursorError) -> Self {
        RepositoryError::Pagination(PaginationError::MalformedCursor(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_error_display() {
        let err = CursorError::InvalidTimestamp("yesterday".to_string());
        assert_eq!(err.to_string(), "cursor timestamp 'yesterday' is not ISO-8601");
    }

    #[test]
    fn test_pagination_error_wraps_cursor_error() {
        let err: PaginationError = CursorError::MissingSeparator.into();
        assert_eq!(
            err.to_string(),
            "malformed cursor: cursor is missing the timestamp/id separator"
        );
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Conflict("already a member".to_string());
        assert_eq!(err.to_string(), "conflict: already a member");

        let err: RepositoryError = CursorError::Encoding.into();
        assert!(matches!(
            err,
            RepositoryError::Pagination(PaginationError::MalformedCursor(CursorError::Encoding))
        ));
    }
}
