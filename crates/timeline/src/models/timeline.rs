//! Unified timeline activity model
//!
//! Internal activities and provider emails are converted into this one
//! shape before merging. The payload is a tagged union so only the
//! `email_thread` case can carry thread members, and the serialized
//! discriminants match the external `type` values
//! (`note`/`email`/.../`email_thread`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Attachment, EmailAddress};

/// Which collaborator an activity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSource {
    Internal,
    Gmail,
}

/// Display fields shared by all email-shaped activities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub from: Option<EmailAddress>,
    #[serde(default)]
    pub to: Vec<EmailAddress>,
    #[serde(default)]
    pub cc: Vec<EmailAddress>,
    #[serde(default)]
    pub bcc: Vec<EmailAddress>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_important: bool,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Synthesized conversation activity covering two or more emails
///
/// Invariants: `emails` holds only `Email` payloads, sorted ascending by
/// timestamp, and always has at least two members (single-email groups
/// stay plain `email` activities). `display` is copied from the latest
/// member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPayload {
    pub thread_id: String,
    #[serde(flatten)]
    pub display: EmailPayload,
    #[serde(rename = "emailsInThread")]
    pub emails: Vec<TimelineActivity>,
    /// UI-only expansion flag, collapsed by default
    #[serde(default)]
    pub is_expanded: bool,
}

impl ThreadPayload {
    /// Number of emails collapsed into this thread (always >= 2)
    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    /// The most recent member, used for display
    pub fn latest_email(&self) -> Option<&TimelineActivity> {
        self.emails.last()
    }
}

/// Per-kind payload of a timeline activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityPayload {
    Note { content: Option<String> },
    Email(EmailPayload),
    Call { content: Option<String> },
    Meeting { content: Option<String> },
    Task { content: Option<String> },
    System { content: Option<String> },
    EmailSent(EmailPayload),
    EmailThread(ThreadPayload),
}

impl ActivityPayload {
    /// External discriminant, matching the serialized `type` field
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Note { .. } => "note",
            Self::Email(_) => "email",
            Self::Call { .. } => "call",
            Self::Meeting { .. } => "meeting",
            Self::Task { .. } => "task",
            Self::System { .. } => "system",
            Self::EmailSent(_) => "email_sent",
            Self::EmailThread(_) => "email_thread",
        }
    }
}

/// One entry in the merged timeline
///
/// A derived view: recomputed from its sources whenever they change,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineActivity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: TimelineSource,
    pub is_pinned: bool,
    #[serde(flatten)]
    pub payload: ActivityPayload,
}

impl TimelineActivity {
    /// The email payload, for plain and CRM-sent email activities
    pub fn as_email(&self) -> Option<&EmailPayload> {
        match &self.payload {
            ActivityPayload::Email(email) | ActivityPayload::EmailSent(email) => Some(email),
            _ => None,
        }
    }

    /// The thread payload, when this is a synthesized `email_thread`
    pub fn as_thread(&self) -> Option<&ThreadPayload> {
        match &self.payload {
            ActivityPayload::EmailThread(thread) => Some(thread),
            _ => None,
        }
    }

    pub fn is_email(&self) -> bool {
        matches!(self.payload, ActivityPayload::Email(_))
    }
}

/// Deterministic id for a synthesized thread activity
pub fn thread_activity_id(thread_id: &str) -> String {
    format!("thread-{}", thread_id)
}
