//! Raw email message model as fetched from the mail provider

use serde::{Deserialize, Serialize};

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name (e.g., "John Doe")
    pub name: Option<String>,
    /// Email address (e.g., "john@example.com")
    pub email: String,
}

impl EmailAddress {
    /// Create a new email address with just the email
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create a new email address with a display name
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Parse an email address from a string like "John Doe <john@example.com>"
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        // Try to parse "Name <email>" format
        if let Some(angle_start) = s.rfind('<')
            && let Some(angle_end) = s.rfind('>')
            && angle_start < angle_end
        {
            let name = s[..angle_start].trim();
            let email = s[angle_start + 1..angle_end].trim();
            return Self {
                name: if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                },
                email: email.to_string(),
            };
        }

        // Otherwise, treat the whole string as an email
        Self {
            name: None,
            email: s.to_string(),
        }
    }

    /// Format the email address for display
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// An attachment reference carried on a raw message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    /// Size in bytes as reported by the provider
    pub size: u64,
}

/// A message fetched from the mail provider
///
/// Treated as immutable once fetched; a mutation on the provider side
/// (e.g. a read-state flip) arrives as a replacement entry with the
/// same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmailMessage {
    /// Provider message id
    pub id: String,
    /// Provider-assigned thread id; may be absent or a synthetic
    /// placeholder for not-yet-delivered messages
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub snippet: String,
    pub from: EmailAddress,
    #[serde(default)]
    pub to: Vec<EmailAddress>,
    #[serde(default)]
    pub cc: Vec<EmailAddress>,
    #[serde(default)]
    pub bcc: Vec<EmailAddress>,
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
    /// ISO-8601 receive date
    pub date: String,
}

/// One fetched page of messages for a contact
///
/// `next_page_token` is the provider's continuation signal; `None`
/// means the contact's history is fully loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPage {
    pub messages: Vec<RawEmailMessage>,
    pub next_page_token: Option<String>,
}

impl EmailPage {
    /// A terminal page with no continuation
    pub fn last(messages: Vec<RawEmailMessage>) -> Self {
        Self {
            messages,
            next_page_token: None,
        }
    }

    /// A page with a continuation token
    pub fn with_token(messages: Vec<RawEmailMessage>, token: impl Into<String>) -> Self {
        Self {
            messages,
            next_page_token: Some(token.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_with_name() {
        let addr = EmailAddress::parse("John Doe <john@example.com>");
        assert_eq!(addr.name, Some("John Doe".to_string()));
        assert_eq!(addr.email, "john@example.com");
    }

    #[test]
    fn test_parse_email_without_name() {
        let addr = EmailAddress::parse("john@example.com");
        assert_eq!(addr.name, None);
        assert_eq!(addr.email, "john@example.com");
    }

    #[test]
    fn test_parse_email_with_angle_brackets_no_name() {
        let addr = EmailAddress::parse("<john@example.com>");
        assert_eq!(addr.name, None);
        assert_eq!(addr.email, "john@example.com");
    }

    #[test]
    fn test_display_with_name() {
        let addr = EmailAddress::with_name("John Doe", "john@example.com");
        assert_eq!(addr.display(), "John Doe <john@example.com>");
    }

    #[test]
    fn test_display_without_name() {
        let addr = EmailAddress::new("john@example.com");
        assert_eq!(addr.display(), "john@example.com");
    }

    #[test]
    fn test_page_continuation() {
        let page = EmailPage::with_token(vec![], "tok-1");
        assert_eq!(page.next_page_token.as_deref(), Some("tok-1"));
        assert!(EmailPage::last(vec![]).next_page_token.is_none());
    }
}
