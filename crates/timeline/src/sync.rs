//! Per-contact email sync coordination
//!
//! Owns the loaded page, pagination cursor, and the
//! `idle -> syncing -> completed/failed` status machine for each
//! contact. Provider failures are converted into state at this
//! boundary and never propagate into the merge path; the previously
//! loaded page is always retained on failure.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::TimelineError;
use crate::models::RawEmailMessage;
use crate::providers::MailProvider;

/// Outcome of the most recent fetch for a contact's email page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Completed,
    Failed,
}

/// Loaded email page and loading flags for one contact
#[derive(Debug, Clone, Default)]
pub struct ContactEmailState {
    pub emails: Vec<RawEmailMessage>,
    pub next_page_token: Option<String>,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub status: SyncStatus,
    /// User the page was loaded for; reused by load_more
    user_id: String,
}

/// Coordinates email loading per contact (keyed by contact email)
///
/// All operations are idempotent with respect to duplicate concurrent
/// calls for the same contact: a per-key in-flight marker short-
/// circuits a second call instead of issuing a duplicate request.
pub struct EmailSyncCoordinator {
    provider: Arc<dyn MailProvider>,
    states: HashMap<String, ContactEmailState>,
    in_flight: HashSet<String>,
}

impl EmailSyncCoordinator {
    pub fn new(provider: Arc<dyn MailProvider>) -> Self {
        Self {
            provider,
            states: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Load the first page for a contact
    pub fn initialize(&mut self, contact_email: &str, user_id: &str) -> SyncStatus {
        if !self.begin(contact_email) {
            return self.status(contact_email);
        }
        let state = self.states.entry(contact_email.to_string()).or_default();
        state.loading = true;
        state.user_id = user_id.to_string();

        let outcome = self.provider.fetch_emails(contact_email, user_id, None);
        let state = self.states.entry(contact_email.to_string()).or_default();
        match outcome {
            Ok(page) => {
                info!(
                    "initialized {} emails for {}",
                    page.messages.len(),
                    contact_email
                );
                state.emails = page.messages;
                state.has_more = page.next_page_token.is_some();
                state.next_page_token = page.next_page_token;
                state.status = SyncStatus::Completed;
            }
            Err(err) => {
                log_fetch_failure("initial load", contact_email, err);
                state.status = SyncStatus::Failed;
            }
        }
        state.loading = false;
        self.finish(contact_email)
    }

    /// Fetch the next page, if the provider signalled one exists
    pub fn load_more(&mut self, contact_email: &str) -> SyncStatus {
        let Some((token, user_id)) = self
            .states
            .get(contact_email)
            .filter(|state| state.has_more)
            .and_then(|state| {
                state
                    .next_page_token
                    .clone()
                    .map(|token| (token, state.user_id.clone()))
            })
        else {
            return self.status(contact_email);
        };
        if !self.begin(contact_email) {
            return self.status(contact_email);
        }
        let state = self.states.entry(contact_email.to_string()).or_default();
        state.loading_more = true;

        let outcome = self
            .provider
            .fetch_emails(contact_email, &user_id, Some(&token));
        let state = self.states.entry(contact_email.to_string()).or_default();
        match outcome {
            Ok(page) => {
                info!(
                    "loaded {} more emails for {}",
                    page.messages.len(),
                    contact_email
                );
                merge_by_id(&mut state.emails, page.messages);
                state.has_more = page.next_page_token.is_some();
                state.next_page_token = page.next_page_token;
                state.status = SyncStatus::Completed;
            }
            Err(err) => {
                // Prior page stays intact; caller may retry via refresh
                log_fetch_failure("load-more", contact_email, err);
                state.status = SyncStatus::Failed;
            }
        }
        state.loading_more = false;
        self.finish(contact_email)
    }

    /// Backfill the contact's full email history
    pub fn sync_history(&mut self, contact_email: &str, user_id: &str) -> SyncStatus {
        if !self.begin(contact_email) {
            return self.status(contact_email);
        }
        let outcome = self.provider.fetch_history(contact_email, user_id);
        let state = self.states.entry(contact_email.to_string()).or_default();
        state.user_id = user_id.to_string();
        match outcome {
            Ok(page) => {
                info!(
                    "history sync fetched {} emails for {}",
                    page.messages.len(),
                    contact_email
                );
                merge_by_id(&mut state.emails, page.messages);
                // A backfill leaves nothing further to page in
                state.next_page_token = None;
                state.has_more = false;
                state.status = SyncStatus::Completed;
            }
            Err(err) => {
                log_fetch_failure("history sync", contact_email, err);
                state.status = SyncStatus::Failed;
            }
        }
        self.finish(contact_email)
    }

    /// Force a re-fetch of the current page, upserting by id
    ///
    /// Replacement entries propagate provider-side mutations (read or
    /// importance flips). The pagination cursor is only adopted when
    /// nothing was loaded yet, so a refresh never truncates an
    /// already-paged window.
    pub fn refresh(&mut self, contact_email: &str, user_id: &str) -> SyncStatus {
        if !self.begin(contact_email) {
            return self.status(contact_email);
        }
        let outcome = self.provider.fetch_emails(contact_email, user_id, None);
        let state = self.states.entry(contact_email.to_string()).or_default();
        state.user_id = user_id.to_string();
        match outcome {
            Ok(page) => {
                let was_empty = state.emails.is_empty();
                merge_by_id(&mut state.emails, page.messages);
                if was_empty {
                    state.has_more = page.next_page_token.is_some();
                    state.next_page_token = page.next_page_token;
                }
                state.status = SyncStatus::Completed;
                info!("refreshed emails for {}", contact_email);
            }
            Err(err) => {
                log_fetch_failure("refresh", contact_email, err);
                state.status = SyncStatus::Failed;
            }
        }
        self.finish(contact_email)
    }

    pub fn emails_for_contact(&self, contact_email: &str) -> &[RawEmailMessage] {
        self.states
            .get(contact_email)
            .map(|state| state.emails.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_loading(&self, contact_email: &str) -> bool {
        self.states
            .get(contact_email)
            .is_some_and(|state| state.loading)
    }

    pub fn is_loading_more(&self, contact_email: &str) -> bool {
        self.states
            .get(contact_email)
            .is_some_and(|state| state.loading_more)
    }

    pub fn has_more(&self, contact_email: &str) -> bool {
        self.states
            .get(contact_email)
            .is_some_and(|state| state.has_more)
    }

    pub fn status(&self, contact_email: &str) -> SyncStatus {
        self.states
            .get(contact_email)
            .map(|state| state.status)
            .unwrap_or_default()
    }

    /// Mark a contact in flight; `false` means a call is already active
    /// for the key and the new one must short-circuit
    fn begin(&mut self, contact_email: &str) -> bool {
        if !self.in_flight.insert(contact_email.to_string()) {
            return false;
        }
        self.states
            .entry(contact_email.to_string())
            .or_default()
            .status = SyncStatus::Syncing;
        true
    }

    fn finish(&mut self, contact_email: &str) -> SyncStatus {
        self.in_flight.remove(contact_email);
        self.status(contact_email)
    }
}

/// Convert a provider failure into the typed boundary error and log it
fn log_fetch_failure(operation: &str, contact_email: &str, err: anyhow::Error) {
    let err = TimelineError::EmailFetch {
        contact: contact_email.to_string(),
        source: err,
    };
    warn!("{}: {:#}", operation, anyhow::Error::from(err));
}

/// Upsert incoming messages into the loaded page by id
///
/// Existing entries are replaced in place so provider-side mutations
/// surface without reordering the page; new entries append.
fn merge_by_id(existing: &mut Vec<RawEmailMessage>, incoming: Vec<RawEmailMessage>) {
    for message in incoming {
        match existing.iter_mut().find(|m| m.id == message.id) {
            Some(slot) => *slot = message,
            None => existing.push(message),
        }
    }
}
