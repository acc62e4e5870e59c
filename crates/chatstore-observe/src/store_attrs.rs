//! Span and event field names for store and repository instrumentation.
//!
//! Usable as `tracing` field names, e.g.
//! `tracing::debug_span!("find_all", { store_attrs::COLLECTION } = E::COLLECTION)`.

/// Entity collection the operation targets (e.g. "messages").
pub const COLLECTION: &str = "store.collection";

/// Operation name (one of the `OP_*` values below).
pub const OPERATION: &str = "store.operation";

/// Identifier of the record being read or written.
pub const RECORD_ID: &str = "store.record_id";

/// Number of records returned by a query.
pub const RESULT_COUNT: &str = "query.result_count";

/// Number of conditional filters applied by a query.
pub const FILTER_COUNT: &str = "query.filter_count";

/// Requested page size.
pub const PAGE_SIZE: &str = "page.size";

/// Document field pages are ordered and keyed on (e.g. "createdAt").
pub const PAGE_ORDER_FIELD: &str = "page.order_field";

/// Pagination direction ("forward" or "backward").
pub const PAGE_DIRECTION: &str = "page.direction";

// --- Operation name values ---

pub const OP_CREATE: &str = "create";
pub const OP_FIND_ALL: &str = "find_all";
pub const OP_UPDATE: &str = "update";
pub const OP_DELETE: &str = "delete";
pub const OP_COUNT: &str = "count";
pub const OP_PAGINATE: &str = "paginate";
