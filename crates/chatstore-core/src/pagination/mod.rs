//! Relay-style cursor pagination.

pub mod cursor;
pub mod engine;
pub mod params;

pub use cursor::{CursorKey, cursor_for, decode_cursor, encode_cursor};
pub use engine::{Connection, Edge, PageInfo, PaginatedResult, Window, paginate, window};
pub use params::{ConnectionArgs, PageDirection, PaginationParams};
