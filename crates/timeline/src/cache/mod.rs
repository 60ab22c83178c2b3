//! Process-wide memoization caches
//!
//! Both caches are correctness-safe to share across contacts: keys
//! embed enough of the input identity (raw string, id + mutable
//! fields) that a changed input can never return a stale hit.

mod timestamp;
mod transform;

pub use timestamp::TimestampCache;
pub use transform::{TransformCache, TransformKey};
