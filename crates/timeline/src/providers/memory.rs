//! In-memory collaborator implementations
//!
//! Used for testing and as stubs before the real provider integrations
//! are available. Pages are scripted per contact; fetches can be made
//! to fail once for failure-path tests.

use anyhow::{Result, bail};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::{ActivityStore, MailProvider, PinnedStore};
use crate::models::{EmailPage, RawEmailMessage, RawInternalActivity};

/// Scripted in-memory mail provider
///
/// Each contact gets an ordered list of pages; page tokens are the
/// index of the next page, so `fetch_emails(None)` returns page 0 and
/// the returned token walks the list.
#[derive(Default)]
pub struct InMemoryMailProvider {
    pages: RwLock<HashMap<String, Vec<Vec<RawEmailMessage>>>>,
    fail_once: RwLock<HashSet<String>>,
    fetch_counts: RwLock<HashMap<String, usize>>,
}

impl InMemoryMailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the pages returned for a contact (replaces any existing)
    pub fn set_pages(&self, contact_email: &str, pages: Vec<Vec<RawEmailMessage>>) {
        self.pages
            .write()
            .unwrap()
            .insert(contact_email.to_string(), pages);
    }

    /// Make the next fetch for this contact fail
    pub fn fail_next_fetch(&self, contact_email: &str) {
        self.fail_once
            .write()
            .unwrap()
            .insert(contact_email.to_string());
    }

    /// How many fetches (pages or history) have been issued for a contact
    pub fn fetch_count(&self, contact_email: &str) -> usize {
        self.fetch_counts
            .read()
            .unwrap()
            .get(contact_email)
            .copied()
            .unwrap_or(0)
    }

    fn record_fetch(&self, contact_email: &str) -> Result<()> {
        *self
            .fetch_counts
            .write()
            .unwrap()
            .entry(contact_email.to_string())
            .or_insert(0) += 1;

        if self.fail_once.write().unwrap().remove(contact_email) {
            bail!("simulated provider failure for {}", contact_email);
        }
        Ok(())
    }
}

impl MailProvider for InMemoryMailProvider {
    fn fetch_emails(
        &self,
        contact_email: &str,
        _user_id: &str,
        page_token: Option<&str>,
    ) -> Result<EmailPage> {
        self.record_fetch(contact_email)?;

        let pages = self.pages.read().unwrap();
        let contact_pages = pages.get(contact_email).cloned().unwrap_or_default();

        let index: usize = match page_token {
            Some(token) => token.parse().unwrap_or(0),
            None => 0,
        };

        let messages = contact_pages.get(index).cloned().unwrap_or_default();
        let next_page_token = if index + 1 < contact_pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };

        Ok(EmailPage {
            messages,
            next_page_token,
        })
    }

    fn fetch_history(&self, contact_email: &str, _user_id: &str) -> Result<EmailPage> {
        self.record_fetch(contact_email)?;

        let pages = self.pages.read().unwrap();
        let messages = pages
            .get(contact_email)
            .map(|pages| pages.iter().flatten().cloned().collect())
            .unwrap_or_default();

        Ok(EmailPage::last(messages))
    }
}

/// In-memory activity store with failure injection
#[derive(Default)]
pub struct InMemoryActivityStore {
    activities: RwLock<HashMap<String, Vec<RawInternalActivity>>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_activities(&self, contact_id: &str, activities: Vec<RawInternalActivity>) {
        self.activities
            .write()
            .unwrap()
            .insert(contact_id.to_string(), activities);
    }

    /// Make every read for this contact fail until cleared
    pub fn set_failing(&self, contact_id: &str, failing: bool) {
        let mut set = self.failing.write().unwrap();
        if failing {
            set.insert(contact_id.to_string());
        } else {
            set.remove(contact_id);
        }
    }
}

impl ActivityStore for InMemoryActivityStore {
    fn activities_for_contact(&self, contact_id: &str) -> Result<Vec<RawInternalActivity>> {
        if self.failing.read().unwrap().contains(contact_id) {
            bail!("simulated activity store failure for {}", contact_id);
        }
        Ok(self
            .activities
            .read()
            .unwrap()
            .get(contact_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory pinned-item flags
#[derive(Default)]
pub struct InMemoryPinnedStore {
    pinned: RwLock<HashSet<String>>,
}

impl InMemoryPinnedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&self, message_id: &str) {
        self.pinned.write().unwrap().insert(message_id.to_string());
    }

    pub fn unpin(&self, message_id: &str) {
        self.pinned.write().unwrap().remove(message_id);
    }
}

impl PinnedStore for InMemoryPinnedStore {
    fn is_email_pinned(&self, message_id: &str) -> bool {
        self.pinned.read().unwrap().contains(message_id)
    }
}
