//! Internal CRM activity model (notes, tasks, logged calls, sent emails)

use serde::{Deserialize, Serialize};

use super::EmailAddress;

/// Kind discriminant for an internal activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalActivityKind {
    Note,
    Email,
    Call,
    Meeting,
    Task,
    System,
    EmailSent,
}

/// Embedded email envelope carried by `EmailSent` activities
///
/// Holds the message the CRM itself sent, so the timeline can render it
/// with the same fields as a provider-fetched email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailEnvelope {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub from: Option<EmailAddress>,
    #[serde(default)]
    pub to: Vec<EmailAddress>,
    #[serde(default)]
    pub cc: Vec<EmailAddress>,
    #[serde(default)]
    pub bcc: Vec<EmailAddress>,
}

/// A locally authored activity owned by the activity collaborator
///
/// The engine only reads these; creation and deletion happen elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInternalActivity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InternalActivityKind,
    #[serde(default)]
    pub content: Option<String>,
    /// ISO-8601 creation timestamp
    pub timestamp: String,
    #[serde(default)]
    pub is_pinned: bool,
    /// Structured payload, populated when `kind` is `EmailSent`
    #[serde(default)]
    pub details: Option<EmailEnvelope>,
}

impl RawInternalActivity {
    pub fn new(
        id: impl Into<String>,
        kind: InternalActivityKind,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            content: None,
            timestamp: timestamp.into(),
            is_pinned: false,
            details: None,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.is_pinned = pinned;
        self
    }

    pub fn details(mut self, details: EmailEnvelope) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&InternalActivityKind::EmailSent).unwrap();
        assert_eq!(json, "\"email_sent\"");
        let kind: InternalActivityKind = serde_json::from_str("\"note\"").unwrap();
        assert_eq!(kind, InternalActivityKind::Note);
    }

    #[test]
    fn test_builder_defaults() {
        let activity =
            RawInternalActivity::new("a1", InternalActivityKind::Note, "2024-01-01T00:00:00Z")
                .content("hello");
        assert!(!activity.is_pinned);
        assert!(activity.details.is_none());
        assert_eq!(activity.content.as_deref(), Some("hello"));
    }
}
