//! Route lookup subsystem.

pub mod table;

pub use table::{ResponsePolicy, RouteEntry, RouteTable, STREAM_CACHE_CONTROL, STREAM_CONTENT_TYPE};
