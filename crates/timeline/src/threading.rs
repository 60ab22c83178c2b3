//! Conversation grouping for email activities
//!
//! Collapses multi-message conversations into single `email_thread`
//! activities. Grouping is authoritative on the provider-assigned
//! thread id: placeholder ids from not-yet-delivered messages never
//! group, and subject text is never a grouping signal on its own
//! (identical subjects with different or absent real thread ids stay
//! standalone).

use log::debug;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::models::{
    ActivityPayload, ThreadPayload, TimelineActivity, TimelineSource, thread_activity_id,
};

/// Synthetic thread-id prefixes assigned client-side before the
/// provider confirms delivery
const PLACEHOLDER_PREFIXES: &[&str] = &["optimistic-", "subject-", "new-conversation-"];
/// Literal sentinel used for in-flight replies
const PLACEHOLDER_SENTINEL: &str = "reply-thread";

/// Sweep the result cache every Nth call rather than on each one
const SWEEP_INTERVAL: u32 = 16;
/// Sorted-id-list portion of the cache key is truncated to this length
const KEY_ID_MAX_LEN: usize = 256;

/// A thread id that can actually group messages
fn real_thread_id(thread_id: Option<&str>) -> Option<&str> {
    let id = thread_id?;
    if id.is_empty() || id == PLACEHOLDER_SENTINEL {
        return None;
    }
    if PLACEHOLDER_PREFIXES.iter().any(|p| id.starts_with(p)) {
        return None;
    }
    Some(id)
}

struct CachedGrouping {
    ids: HashSet<String>,
    result: Vec<TimelineActivity>,
    created: Instant,
}

/// Groups email activities into conversations, with a result cache
/// keyed by the exact input id-set
///
/// The cache models "no recompute when nothing changed", not
/// approximate reuse: a hit is only returned when the stored id-set
/// matches the input exactly.
pub struct ThreadGrouper {
    cache: HashMap<String, CachedGrouping>,
    capacity: usize,
    ttl: Duration,
    calls: u32,
}

impl ThreadGrouper {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: HashMap::new(),
            capacity,
            ttl,
            calls: 0,
        }
    }

    /// Group a contact's email activities into threads
    ///
    /// Output order is not significant; the merger re-sorts downstream.
    pub fn group(&mut self, emails: &[TimelineActivity]) -> Vec<TimelineActivity> {
        self.calls = self.calls.wrapping_add(1);
        if self.calls % SWEEP_INTERVAL == 0 {
            self.sweep(Instant::now());
        }

        let key = cache_key(emails);
        if let Some(cached) = self.cache.get(&key)
            && cached.ids.len() == emails.len()
            && emails.iter().all(|e| cached.ids.contains(&e.id))
        {
            return cached.result.clone();
        }

        let result = group_emails(emails);
        let ids = emails.iter().map(|e| e.id.clone()).collect();
        self.cache.insert(
            key,
            CachedGrouping {
                ids,
                result: result.clone(),
                created: Instant::now(),
            },
        );
        result
    }

    /// Drop expired entries, and past the size bound drop the oldest half
    pub fn sweep(&mut self, now: Instant) {
        let before = self.cache.len();
        let ttl = self.ttl;
        self.cache
            .retain(|_, entry| now.duration_since(entry.created) < ttl);

        if self.cache.len() > self.capacity {
            let mut by_age: Vec<(String, Instant)> = self
                .cache
                .iter()
                .map(|(key, entry)| (key.clone(), entry.created))
                .collect();
            by_age.sort_by_key(|(_, created)| *created);
            for (key, _) in by_age.into_iter().take(self.cache.len() / 2) {
                self.cache.remove(&key);
            }
        }

        if self.cache.len() < before {
            debug!("grouping cache swept {} -> {}", before, self.cache.len());
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Cache key: input cardinality plus the sorted id list, truncated
///
/// Truncation means the key alone is not collision-free; the exact
/// id-set check on lookup is what guarantees correctness.
fn cache_key(emails: &[TimelineActivity]) -> String {
    let mut ids: Vec<&str> = emails.iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    let mut joined = ids.join(",");
    if joined.len() > KEY_ID_MAX_LEN {
        let mut cut = KEY_ID_MAX_LEN;
        while !joined.is_char_boundary(cut) {
            cut -= 1;
        }
        joined.truncate(cut);
    }
    format!("{}-{}", emails.len(), joined)
}

fn group_emails(emails: &[TimelineActivity]) -> Vec<TimelineActivity> {
    let mut groups: HashMap<&str, Vec<&TimelineActivity>> = HashMap::new();
    let mut result: Vec<TimelineActivity> = Vec::new();

    for email in emails {
        let thread_id = email
            .as_email()
            .and_then(|payload| real_thread_id(payload.thread_id.as_deref()));
        match thread_id {
            Some(id) => groups.entry(id).or_default().push(email),
            // No real thread id: always standalone
            None => result.push(email.clone()),
        }
    }

    for (thread_id, mut members) in groups {
        // Single-message groups stay plain emails, never one-element threads
        if members.len() < 2 {
            result.extend(members.into_iter().cloned());
            continue;
        }

        members.sort_by_key(|email| email.timestamp);
        let sorted: Vec<TimelineActivity> = members.into_iter().cloned().collect();
        result.push(build_thread(thread_id, sorted));
    }

    result
}

fn build_thread(thread_id: &str, members: Vec<TimelineActivity>) -> TimelineActivity {
    let latest = members
        .last()
        .expect("thread groups always have at least two members");
    let display = latest.as_email().cloned().unwrap_or_default();
    let is_pinned = members.iter().any(|email| email.is_pinned);
    let timestamp = latest.timestamp;

    TimelineActivity {
        id: thread_activity_id(thread_id),
        timestamp,
        source: TimelineSource::Gmail,
        is_pinned,
        payload: ActivityPayload::EmailThread(ThreadPayload {
            thread_id: thread_id.to_string(),
            display,
            emails: members,
            is_expanded: false,
        }),
    }
}
