//! Pure merge and ordering functions for the combined timeline
//!
//! These run over whatever data is currently available and never fail;
//! degradation happens upstream.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::cache::TimestampCache;
use crate::models::{RawEmailMessage, TimelineActivity};

/// Global timeline order: all pinned activities first, each partition
/// by timestamp descending. The sort is stable, so equal keys keep
/// their insertion order.
pub fn sort_timeline(activities: &mut [TimelineActivity]) {
    activities.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
}

/// Drop duplicate ids, keeping the first occurrence
pub fn dedupe_by_id(activities: Vec<TimelineActivity>) -> Vec<TimelineActivity> {
    let mut seen = HashSet::new();
    activities
        .into_iter()
        .filter(|activity| seen.insert(activity.id.clone()))
        .collect()
}

/// Date of the chronologically oldest loaded email
///
/// Used by callers to show "relationship since" without a full fetch.
pub fn oldest_email_date(
    emails: &[RawEmailMessage],
    timestamps: &mut TimestampCache,
) -> Option<DateTime<Utc>> {
    emails
        .iter()
        .map(|email| timestamps.datetime(&email.date))
        .min()
}
