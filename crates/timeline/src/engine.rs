//! Timeline orchestration
//!
//! Wires the collaborators, caches, grouper, and sync coordinator
//! together per contact and produces the merged, sorted activity
//! snapshot the UI renders. The only public entry point of the engine.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{TimestampCache, TransformCache};
use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::merge::{dedupe_by_id, oldest_email_date, sort_timeline};
use crate::models::TimelineActivity;
use crate::providers::{ActivityStore, MailProvider, PinnedStore};
use crate::sync::{EmailSyncCoordinator, SyncStatus};
use crate::threading::ThreadGrouper;
use crate::throttle::Throttle;
use crate::transform::{transform_email, transform_internal};

/// Which contact's timeline the engine is computing, and for whom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineView {
    pub contact_id: String,
    pub contact_email: String,
    pub user_id: String,
    pub include_emails: bool,
    pub auto_initialize: bool,
}

impl TimelineView {
    pub fn new(
        contact_id: impl Into<String>,
        contact_email: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            contact_id: contact_id.into(),
            contact_email: contact_email.into(),
            user_id: user_id.into(),
            include_emails: true,
            auto_initialize: true,
        }
    }

    pub fn include_emails(mut self, include: bool) -> Self {
        self.include_emails = include;
        self
    }

    pub fn auto_initialize(mut self, auto: bool) -> Self {
        self.auto_initialize = auto;
        self
    }
}

/// The merged timeline plus loading and sync metadata for one view
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    /// Merged, de-duplicated, pinned-first / recency-sorted activities
    pub activities: Vec<TimelineActivity>,
    pub loading: bool,
    pub loading_more: bool,
    /// Set when the internal-activity read failed; email activities
    /// still render (graceful degradation)
    pub error: Option<String>,
    /// Raw loaded emails for the contact (pre-grouping)
    pub emails_count: usize,
    pub internal_count: usize,
    pub has_more_emails: bool,
    pub sync_status: SyncStatus,
    /// Date of the chronologically oldest loaded email
    pub oldest_email_date: Option<DateTime<Utc>>,
}

/// The engine's public entry point
///
/// Process-wide: one instance serves all contacts, sharing the caches
/// across them (keys embed enough input identity to prevent
/// cross-contact collisions).
pub struct TimelineEngine {
    activities: Arc<dyn ActivityStore>,
    pinned: Arc<dyn PinnedStore>,
    sync: EmailSyncCoordinator,
    grouper: ThreadGrouper,
    timestamps: TimestampCache,
    transforms: TransformCache,
    /// (contact_email, user_id) pairs already auto-initialized
    initialized: HashSet<(String, String)>,
    refresh_throttle: Throttle,
    active: Option<TimelineView>,
    default_include_emails: bool,
    default_auto_initialize: bool,
}

impl TimelineEngine {
    pub fn new(
        provider: Arc<dyn MailProvider>,
        activities: Arc<dyn ActivityStore>,
        pinned: Arc<dyn PinnedStore>,
        config: TimelineConfig,
    ) -> Self {
        Self {
            activities,
            pinned,
            sync: EmailSyncCoordinator::new(provider),
            grouper: ThreadGrouper::new(
                config.grouping_cache_capacity,
                Duration::from_secs(config.grouping_cache_ttl_secs),
            ),
            timestamps: TimestampCache::new(config.timestamp_cache_capacity),
            transforms: TransformCache::new(config.transform_cache_capacity),
            initialized: HashSet::new(),
            refresh_throttle: Throttle::new(Duration::from_millis(config.refresh_throttle_ms)),
            active: None,
            default_include_emails: config.include_emails,
            default_auto_initialize: config.auto_initialize,
        }
    }

    /// A view seeded with the configured include/auto-init defaults
    pub fn default_view(
        &self,
        contact_id: impl Into<String>,
        contact_email: impl Into<String>,
        user_id: impl Into<String>,
    ) -> TimelineView {
        TimelineView::new(contact_id, contact_email, user_id)
            .include_emails(self.default_include_emails)
            .auto_initialize(self.default_auto_initialize)
    }

    /// Compute the merged timeline for a view
    ///
    /// Auto-initializes email loading exactly once per
    /// (contact, user) pair unless the view disables it.
    pub fn snapshot(&mut self, view: &TimelineView) -> TimelineSnapshot {
        self.active = Some(view.clone());

        if view.include_emails && view.auto_initialize {
            let key = (view.contact_email.clone(), view.user_id.clone());
            if !self.initialized.contains(&key) {
                self.initialized.insert(key);
                self.sync.initialize(&view.contact_email, &view.user_id);
            }
        }

        let mut error = None;
        let mut merged: Vec<TimelineActivity> = Vec::new();
        match self.activities.activities_for_contact(&view.contact_id) {
            Ok(raw) => {
                for activity in &raw {
                    merged.push(transform_internal(
                        activity,
                        &mut self.timestamps,
                        &mut self.transforms,
                    ));
                }
            }
            Err(err) => {
                // Degrade: email activities still render
                let err = TimelineError::ActivityLoad(err);
                warn!("contact {}: {:#}", view.contact_id, err);
                error = Some(err.to_string());
            }
        }
        let internal_count = merged.len();

        let mut emails_count = 0;
        let mut oldest = None;
        if view.include_emails {
            let raw = self.sync.emails_for_contact(&view.contact_email).to_vec();
            emails_count = raw.len();
            oldest = oldest_email_date(&raw, &mut self.timestamps);

            let mut transformed = Vec::with_capacity(raw.len());
            for message in &raw {
                let is_pinned = self.pinned.is_email_pinned(&message.id);
                transformed.push(transform_email(
                    message,
                    is_pinned,
                    &mut self.timestamps,
                    &mut self.transforms,
                ));
            }
            merged.extend(self.grouper.group(&transformed));
        }

        let mut activities = dedupe_by_id(merged);
        sort_timeline(&mut activities);

        TimelineSnapshot {
            activities,
            loading: view.include_emails && self.sync.is_loading(&view.contact_email),
            loading_more: view.include_emails && self.sync.is_loading_more(&view.contact_email),
            error,
            emails_count,
            internal_count,
            has_more_emails: view.include_emails && self.sync.has_more(&view.contact_email),
            sync_status: self.sync.status(&view.contact_email),
            oldest_email_date: oldest,
        }
    }

    /// Fetch the next email page for the active view
    pub fn load_more_emails(&mut self) -> SyncStatus {
        match self.active_contact() {
            Some(contact) => self.sync.load_more(&contact),
            None => SyncStatus::Idle,
        }
    }

    /// Trigger a full history backfill for the active view
    pub fn sync_email_history(&mut self) -> SyncStatus {
        match self.active_view() {
            Some((contact, user)) => self.sync.sync_history(&contact, &user),
            None => SyncStatus::Idle,
        }
    }

    /// Force a re-fetch of the active view's current page
    pub fn refresh_emails(&mut self) -> SyncStatus {
        match self.active_view() {
            Some((contact, user)) => self.sync.refresh(&contact, &user),
            None => SyncStatus::Idle,
        }
    }

    /// Provider push notification that a background sync finished
    ///
    /// Refreshes only when the notification matches the active view
    /// (a superseded notification for a contact we navigated away from
    /// is discarded), and runs through the leading-edge throttle so a
    /// burst of notifications produces at most one refresh per window.
    /// Returns `true` when a refresh ran.
    pub fn handle_sync_complete(
        &mut self,
        contact_email: &str,
        user_id: &str,
        now: Instant,
    ) -> bool {
        let Some(view) = &self.active else {
            return false;
        };
        if !view.include_emails
            || view.contact_email != contact_email
            || view.user_id != user_id
        {
            debug!(
                "ignoring sync-complete for {} (active view differs)",
                contact_email
            );
            return false;
        }

        if self.refresh_throttle.acquire(now) {
            self.sync.refresh(contact_email, user_id);
            true
        } else {
            false
        }
    }

    /// Fire a deferred throttled refresh once the window boundary has
    /// passed. Call from the embedding app's tick. Returns `true` when
    /// a refresh ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.refresh_throttle.poll(now) {
            return false;
        }
        match self.active_view() {
            Some((contact, user)) => {
                self.sync.refresh(&contact, &user);
                true
            }
            None => false,
        }
    }

    fn active_contact(&self) -> Option<String> {
        self.active.as_ref().map(|view| view.contact_email.clone())
    }

    fn active_view(&self) -> Option<(String, String)> {
        self.active
            .as_ref()
            .map(|view| (view.contact_email.clone(), view.user_id.clone()))
    }
}
