//! Memoized raw-record transforms

use log::debug;
use std::collections::HashMap;

use crate::models::TimelineActivity;

/// Cache key for a transformed record
///
/// Embeds the two mutable fields (timestamp, pinned) alongside the id,
/// so any edit to either is structurally guaranteed to miss and
/// recompute. That key shape is the invalidation mechanism; the cache
/// itself never inspects values for staleness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformKey {
    pub id: String,
    pub timestamp: String,
    pub pinned: bool,
}

impl TransformKey {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>, pinned: bool) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            pinned,
        }
    }
}

/// Memoizes raw-record to `TimelineActivity` conversions
///
/// Eviction is a full flush past the bound, same policy as the
/// timestamp cache.
pub struct TransformCache {
    entries: HashMap<TransformKey, TimelineActivity>,
    capacity: usize,
}

impl TransformCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Return the cached transform for `key`, or compute and store one
    pub fn get_or_compute(
        &mut self,
        key: TransformKey,
        compute: impl FnOnce() -> TimelineActivity,
    ) -> TimelineActivity {
        if let Some(activity) = self.entries.get(&key) {
            return activity.clone();
        }

        let activity = compute();
        if self.entries.len() >= self.capacity {
            debug!("transform cache flush at {} entries", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(key, activity.clone());
        activity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
