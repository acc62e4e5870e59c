//! Cursor pagination over an in-memory candidate set.
//!
//! Every call runs the same pipeline: sort the candidates by their cursor
//! key, drop everything on the wrong side of the cursor, take one record
//! more than the page size from the requested end, then trim the probe and
//! restore ascending order. The probe record only answers "is there more"
//! and never reaches the caller.
//!
//! Two views are built on top of that window:
//! - [`paginate`] returns a relay [`Connection`]. Its page flags treat an
//!   un-cursored forward page as the latest page, so `hasPreviousPage`
//!   reports older records beyond it.
//! - [`PaginatedResult::from_window`] is what the repositories return. Its
//!   flags describe the window itself: forward pages have a next page when
//!   the probe existed and a previous page when an `after` cursor was used.

use chatstore_types::config::PaginationConfig;
use chatstore_types::error::PaginationError;
use chatstore_types::record::Entity;
use serde::Serialize;

use super::cursor::{CursorKey, cursor_for};
use super::params::{ConnectionArgs, PageDirection, PaginationParams};

/// One page of records, before page flags are computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    /// Records in ascending cursor order, at most `limit` of them.
    pub items: Vec<T>,
    /// Whether the probe record existed past the far end of the page.
    pub has_more: bool,
    pub direction: PageDirection,
    pub had_after: bool,
    pub had_before: bool,
}

/// Cut one page out of `candidates`.
///
/// Candidates are sorted ascending by `(cursor timestamp, id)` first, so
/// records that share a timestamp always come out in the same order.
pub fn window<E: Entity>(
    mut candidates: Vec<E>,
    params: &PaginationParams,
) -> Result<Window<E>, PaginationError> {
    let (after, before) = params.validate()?;

    candidates.sort_by(|a, b| {
        a.cursor_timestamp()
            .cmp(&b.cursor_timestamp())
            .then_with(|| a.id().cmp(b.id()))
    });

    let in_range = |record: &E| {
        let key = CursorKey::of(record);
        after.as_ref().is_none_or(|after| key > *after)
            && before.as_ref().is_none_or(|before| key < *before)
    };
    let probe = params.limit.saturating_add(1);

    let (items, has_more) = match params.direction {
        PageDirection::Forward => {
            let mut items: Vec<E> = candidates.into_iter().filter(in_range).take(probe).collect();
            let has_more = items.len() > params.limit;
            items.truncate(params.limit);
            (items, has_more)
        }
        PageDirection::Backward => {
            let mut items: Vec<E> = candidates
                .into_iter()
                .rev()
                .filter(in_range)
                .take(probe)
                .collect();
            let has_more = items.len() > params.limit;
            items.truncate(params.limit);
            items.reverse();
            (items, has_more)
        }
    };

    Ok(Window {
        items,
        has_more,
        direction: params.direction,
        had_after: after.is_some(),
        had_before: before.is_some(),
    })
}

// ---------------------------------------------------------------------------
// Relay connection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// A relay page: edges, page info and the size of the unpaged result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    pub total_count: usize,
}

impl<T> Connection<T> {
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// Build a relay page from a filtered candidate set.
///
/// `total_count` is the size of the matching set before any cursor
/// trimming; it is passed through unchanged.
pub fn paginate<E: Entity>(
    candidates: Vec<E>,
    args: &ConnectionArgs,
    total_count: usize,
    config: &PaginationConfig,
) -> Result<Connection<E>, PaginationError> {
    let params = args.to_params(config)?;
    let window = window(candidates, &params)?;

    let (has_next_page, has_previous_page) = match window.direction {
        PageDirection::Forward => (window.has_more, window.had_after || window.has_more),
        PageDirection::Backward => (window.had_before, window.has_more),
    };

    let edges: Vec<Edge<E>> = window
        .items
        .into_iter()
        .map(|node| Edge {
            cursor: cursor_for(&node),
            node,
        })
        .collect();

    let page_info = PageInfo {
        has_next_page,
        has_previous_page,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Ok(Connection {
        edges,
        page_info,
        total_count,
    })
}

// ---------------------------------------------------------------------------
// Repository page
// ---------------------------------------------------------------------------

/// Page returned by the repository pagination entry points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> PaginatedResult<T> {
    pub fn from_window(window: Window<T>, total_count: usize) -> Self {
        let (has_next_page, has_previous_page) = match window.direction {
            PageDirection::Forward => (window.has_more || window.had_before, window.had_after),
            PageDirection::Backward => (window.had_before, window.has_more || window.had_after),
        };
        Self {
            items: window.items,
            total_count,
            has_next_page,
            has_previous_page,
        }
    }
}

impl<T: Entity> PaginatedResult<T> {
    pub fn start_cursor(&self) -> Option<String> {
        self.items.first().map(cursor_for)
    }

    pub fn end_cursor(&self) -> Option<String> {
        self.items.last().map(cursor_for)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::cursor::encode_cursor;
    use chatstore_types::message::{CreateMessageRequest, Message};
    use chatstore_types::record::RecordMeta;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(n)
    }

    fn message(id: &str, at: DateTime<Utc>) -> Message {
        Message::from_request(
            RecordMeta::new(id.to_string(), at),
            CreateMessageRequest {
                chat_id: "c1".to_string(),
                sender_id: "u1".to_string(),
                content: format!("message {id}"),
                message_type: None,
                reply_to_id: None,
            },
        )
    }

    /// Five messages m1..m5 at t1..t5, inserted out of order.
    fn five() -> Vec<Message> {
        vec![
            message("m3", t(3)),
            message("m1", t(1)),
            message("m5", t(5)),
            message("m2", t(2)),
            message("m4", t(4)),
        ]
    }

    fn ids<T: Entity>(items: impl IntoIterator<Item = T>) -> Vec<String> {
        items.into_iter().map(|m| m.id().to_string()).collect()
    }

    fn node_ids(conn: &Connection<Message>) -> Vec<&str> {
        conn.nodes().map(|m| m.id.as_str()).collect()
    }

    fn config() -> PaginationConfig {
        PaginationConfig::default()
    }

    #[test]
    fn test_window_forward_from_start() {
        let w = window(five(), &PaginationParams::forward(2)).unwrap();
        assert_eq!(ids(w.items), vec!["m1", "m2"]);
        assert!(w.has_more);
    }

    #[test]
    fn test_window_backward_returns_ascending_tail() {
        let w = window(five(), &PaginationParams::backward(2)).unwrap();
        assert_eq!(ids(w.items), vec!["m4", "m5"]);
        assert!(w.has_more);
    }

    #[test]
    fn test_window_exact_fit_has_no_more() {
        let w = window(five(), &PaginationParams::forward(5)).unwrap();
        assert_eq!(w.items.len(), 5);
        assert!(!w.has_more);
    }

    #[test]
    fn test_window_ties_break_by_id() {
        let same = t(0);
        let records = vec![message("b", same), message("c", same), message("a", same)];
        let first = window(records.clone(), &PaginationParams::forward(2)).unwrap();
        assert_eq!(ids(first.items), vec!["a", "b"]);

        let next = window(
            records,
            &PaginationParams::forward(2).after(encode_cursor(same, "b")),
        )
        .unwrap();
        assert_eq!(ids(next.items), vec!["c"]);
        assert!(!next.has_more);
    }

    #[test]
    fn test_window_rejects_malformed_cursor() {
        let err = window(five(), &PaginationParams::forward(2).after("@@")).unwrap_err();
        assert!(matches!(err, PaginationError::MalformedCursor(_)));
    }

    #[test]
    fn test_relay_forward_without_cursor() {
        let conn = paginate(five(), &ConnectionArgs::first(2), 5, &config()).unwrap();
        assert_eq!(node_ids(&conn), vec!["m1", "m2"]);
        assert_eq!(conn.total_count, 5);
        assert!(conn.page_info.has_next_page);
        // An un-cursored forward page is the "latest" page: more records
        // beyond it count as previous.
        assert!(conn.page_info.has_previous_page);
        assert_eq!(conn.page_info.start_cursor.as_deref(), Some(conn.edges[0].cursor.as_str()));
        assert_eq!(conn.page_info.end_cursor, Some(encode_cursor(t(2), "m2")));
    }

    #[test]
    fn test_relay_forward_page_holding_everything() {
        for n in [5, 8] {
            let conn = paginate(five(), &ConnectionArgs::first(n), 5, &config()).unwrap();
            assert_eq!(node_ids(&conn), vec!["m1", "m2", "m3", "m4", "m5"]);
            assert!(!conn.page_info.has_next_page, "first={n}");
            assert!(!conn.page_info.has_previous_page, "first={n}");
            assert_eq!(conn.total_count, 5);
        }
    }

    #[test]
    fn test_relay_forward_after_cursor() {
        let args = ConnectionArgs::first(2).after(encode_cursor(t(2), "m2"));
        let conn = paginate(five(), &args, 5, &config()).unwrap();
        assert_eq!(node_ids(&conn), vec!["m3", "m4"]);
        assert!(conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    #[test]
    fn test_relay_forward_last_page() {
        let args = ConnectionArgs::first(2).after(encode_cursor(t(4), "m4"));
        let conn = paginate(five(), &args, 5, &config()).unwrap();
        assert_eq!(node_ids(&conn), vec!["m5"]);
        assert!(!conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    #[test]
    fn test_relay_backward_before_cursor() {
        let args = ConnectionArgs::last(2).before(encode_cursor(t(4), "m4"));
        let conn = paginate(five(), &args, 5, &config()).unwrap();
        assert_eq!(node_ids(&conn), vec!["m2", "m3"]);
        assert!(conn.page_info.has_previous_page);
        assert!(conn.page_info.has_next_page);
    }

    #[test]
    fn test_relay_backward_without_cursor() {
        let conn = paginate(five(), &ConnectionArgs::last(3), 5, &config()).unwrap();
        assert_eq!(node_ids(&conn), vec!["m3", "m4", "m5"]);
        assert!(conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
    }

    #[test]
    fn test_relay_every_edge_follows_after_cursor() {
        let boundary = encode_cursor(t(3), "m3");
        let args = ConnectionArgs::first(10).after(boundary);
        let conn = paginate(five(), &args, 5, &config()).unwrap();
        let floor = CursorKey::new(t(3), "m3");
        assert!(conn.nodes().all(|m| CursorKey::of(m) > floor));
        assert_eq!(node_ids(&conn), vec!["m4", "m5"]);
    }

    #[test]
    fn test_relay_empty_page() {
        let conn =
            paginate(Vec::<Message>::new(), &ConnectionArgs::first(2), 0, &config()).unwrap();
        assert!(conn.edges.is_empty());
        assert_eq!(conn.page_info, PageInfo::default());
        assert_eq!(conn.total_count, 0);
    }

    #[test]
    fn test_relay_rejects_both_page_sizes() {
        let args = ConnectionArgs {
            first: Some(2),
            last: Some(2),
            ..Default::default()
        };
        let err = paginate(five(), &args, 5, &config()).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidArgs(_)));
    }

    #[test]
    fn test_repository_page_flags() {
        let first = PaginatedResult::from_window(
            window(five(), &PaginationParams::forward(2)).unwrap(),
            5,
        );
        assert_eq!(ids(first.items.clone()), vec!["m1", "m2"]);
        assert!(first.has_next_page);
        assert!(!first.has_previous_page);

        let after = first.end_cursor().unwrap();
        let second = PaginatedResult::from_window(
            window(five(), &PaginationParams::forward(2).after(after)).unwrap(),
            5,
        );
        assert_eq!(ids(second.items.clone()), vec!["m3", "m4"]);
        assert!(second.has_next_page);
        assert!(second.has_previous_page);

        let before = second.start_cursor().unwrap();
        let back = PaginatedResult::from_window(
            window(five(), &PaginationParams::backward(2).before(before)).unwrap(),
            5,
        );
        assert_eq!(ids(back.items), vec!["m1", "m2"]);
        assert!(back.has_next_page);
        assert!(!back.has_previous_page);
    }
}
