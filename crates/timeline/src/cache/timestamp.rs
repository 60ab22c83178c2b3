//! Memoized ISO-8601 timestamp parsing

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::debug;
use std::collections::HashMap;

/// Caches parsed timestamps to avoid re-parsing the same date strings
/// on every recomputation pass.
///
/// Eviction is a full flush once the bound is exceeded: parse cost is
/// trivial, so coverage after a flush does not matter, only
/// determinism does.
pub struct TimestampCache {
    entries: HashMap<String, i64>,
    capacity: usize,
}

impl TimestampCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Epoch milliseconds for an ISO-8601 string
    ///
    /// Unparseable input yields 0 (sorts last) rather than an error; a
    /// malformed record must never abort a merge.
    pub fn millis(&mut self, raw: &str) -> i64 {
        if let Some(&millis) = self.entries.get(raw) {
            return millis;
        }

        let millis = parse_millis(raw);
        if self.entries.len() >= self.capacity {
            debug!("timestamp cache flush at {} entries", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(raw.to_string(), millis);
        millis
    }

    /// Parsed timestamp as a `DateTime<Utc>`
    pub fn datetime(&mut self, raw: &str) -> DateTime<Utc> {
        let millis = self.millis(raw);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_millis(raw: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    // Date-only strings show up in older activity records
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(dt) = date.and_hms_opt(0, 0, 0)
    {
        return dt.and_utc().timestamp_millis();
    }
    0
}
