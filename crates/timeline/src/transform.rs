//! Conversion of raw records into unified timeline activities
//!
//! Both entry points route through the transform cache, keyed by
//! (id, timestamp, pinned). Missing or malformed fields get safe
//! defaults; a single bad record never aborts a merge.

use crate::cache::{TimestampCache, TransformCache, TransformKey};
use crate::models::{
    ActivityPayload, EmailEnvelope, EmailPayload, InternalActivityKind, RawEmailMessage,
    RawInternalActivity, TimelineActivity, TimelineSource,
};

/// Transform a locally authored activity
pub fn transform_internal(
    raw: &RawInternalActivity,
    timestamps: &mut TimestampCache,
    cache: &mut TransformCache,
) -> TimelineActivity {
    let key = TransformKey::new(&raw.id, &raw.timestamp, raw.is_pinned);
    let timestamp = timestamps.datetime(&raw.timestamp);

    cache.get_or_compute(key, || {
        let payload = match raw.kind {
            InternalActivityKind::Note => ActivityPayload::Note {
                content: raw.content.clone(),
            },
            InternalActivityKind::Call => ActivityPayload::Call {
                content: raw.content.clone(),
            },
            InternalActivityKind::Meeting => ActivityPayload::Meeting {
                content: raw.content.clone(),
            },
            InternalActivityKind::Task => ActivityPayload::Task {
                content: raw.content.clone(),
            },
            InternalActivityKind::System => ActivityPayload::System {
                content: raw.content.clone(),
            },
            InternalActivityKind::Email => {
                ActivityPayload::Email(expand_envelope(raw.details.as_ref(), &raw.content))
            }
            InternalActivityKind::EmailSent => {
                ActivityPayload::EmailSent(expand_envelope(raw.details.as_ref(), &raw.content))
            }
        };

        TimelineActivity {
            id: raw.id.clone(),
            timestamp,
            source: TimelineSource::Internal,
            is_pinned: raw.is_pinned,
            payload,
        }
    })
}

/// Transform a provider-fetched email
///
/// The pinned flag is owned by the pinned-items collaborator and is
/// passed in resolved, so it participates in the cache key.
pub fn transform_email(
    raw: &RawEmailMessage,
    pinned: bool,
    timestamps: &mut TimestampCache,
    cache: &mut TransformCache,
) -> TimelineActivity {
    let key = TransformKey::new(&raw.id, &raw.date, pinned);
    let timestamp = timestamps.datetime(&raw.date);

    cache.get_or_compute(key, || TimelineActivity {
        id: raw.id.clone(),
        timestamp,
        source: TimelineSource::Gmail,
        is_pinned: pinned,
        payload: ActivityPayload::Email(EmailPayload {
            subject: raw.subject.clone(),
            thread_id: raw.thread_id.clone(),
            from: Some(raw.from.clone()),
            to: raw.to.clone(),
            cc: raw.cc.clone(),
            bcc: raw.bcc.clone(),
            snippet: raw.snippet.clone(),
            is_read: raw.is_read,
            is_important: raw.is_important,
            body_text: raw.body_text.clone(),
            body_html: raw.body_html.clone(),
            labels: raw.labels.clone(),
            attachments: raw.attachments.clone(),
        }),
    })
}

/// Expand an embedded envelope into top-level email fields for uniform
/// rendering. Activities recorded without an envelope still render,
/// with the plain content standing in for the body.
fn expand_envelope(details: Option<&EmailEnvelope>, content: &Option<String>) -> EmailPayload {
    let envelope = details.cloned().unwrap_or_default();
    EmailPayload {
        subject: envelope.subject,
        thread_id: None,
        from: envelope.from,
        to: envelope.to,
        cc: envelope.cc,
        bcc: envelope.bcc,
        snippet: String::new(),
        is_read: true,
        is_important: false,
        body_text: envelope.body_text.or_else(|| content.clone()),
        body_html: envelope.body_html,
        labels: Vec::new(),
        attachments: Vec::new(),
    }
}
