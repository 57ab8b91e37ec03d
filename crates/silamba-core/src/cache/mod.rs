//! Read-through query cache over the catalog collections.
//!
//! `QueryCache` keeps the last fetched copy of each `Resource`, shares a
//! single in-flight request between concurrent readers of the same key,
//! and invalidates a key after every successful mutation of it.
//!
//! Consistency is last-write-wins: there is no locking or conflict
//! detection between two admins editing the same collection.

pub mod entry;
pub mod query;
pub mod source;

pub use entry::{age_display, CachedData};
pub use query::{CacheError, EntryStatus, Query, QueryCache};
pub use source::CollectionSource;
