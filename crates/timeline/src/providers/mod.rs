//! External collaborator traits
//!
//! The engine is a library consumed by UI code; everything it does not
//! own (mail-provider wire access, activity persistence, pinned items)
//! sits behind these traits. `memory` provides in-memory
//! implementations used for tests and as stubs while the real
//! integrations are wired up.

mod memory;

pub use memory::{InMemoryActivityStore, InMemoryMailProvider, InMemoryPinnedStore};

use anyhow::Result;

use crate::models::{EmailPage, RawInternalActivity};

/// Raw fetch access to the external mail provider
///
/// Page state (what is loaded, whether more exists) is owned by the
/// sync coordinator, not the provider; this trait only moves bytes.
/// OAuth, retries, and timeouts are the implementation's concern; the
/// engine only distinguishes success from failure.
pub trait MailProvider: Send + Sync {
    /// Fetch one page of messages for a contact. `page_token` of `None`
    /// requests the first page; the returned page's token continues
    /// pagination.
    fn fetch_emails(
        &self,
        contact_email: &str,
        user_id: &str,
        page_token: Option<&str>,
    ) -> Result<EmailPage>;

    /// Fetch the contact's full message history (backfill)
    fn fetch_history(&self, contact_email: &str, user_id: &str) -> Result<EmailPage>;
}

/// Read access to locally authored CRM activities
pub trait ActivityStore: Send + Sync {
    fn activities_for_contact(&self, contact_id: &str) -> Result<Vec<RawInternalActivity>>;
}

/// Read access to the user's pinned-item flags
pub trait PinnedStore: Send + Sync {
    fn is_email_pinned(&self, message_id: &str) -> bool;
}
