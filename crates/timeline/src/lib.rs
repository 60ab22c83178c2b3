//! Timeline crate - Activity aggregation and email threading for CRM contacts
//!
//! This crate provides the contact-timeline engine:
//! - Domain models (RawInternalActivity, RawEmailMessage, TimelineActivity)
//! - Memoization caches for timestamp parsing and record transforms
//! - Thread grouping over provider-assigned thread ids
//! - Per-contact email sync coordination with pagination and retry state
//! - The orchestrating engine that merges both sources into one
//!   pinned-first, recency-sorted view
//!
//! The crate has zero UI dependencies; mail-provider access, activity
//! persistence, and pinned-item flags are consumed through collaborator
//! traits.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod models;
pub mod providers;
pub mod sync;
pub mod threading;
pub mod throttle;
pub mod transform;

pub use cache::{TimestampCache, TransformCache, TransformKey};
pub use config::TimelineConfig;
pub use engine::{TimelineEngine, TimelineSnapshot, TimelineView};
pub use error::TimelineError;
pub use merge::{dedupe_by_id, oldest_email_date, sort_timeline};
pub use models::{
    ActivityPayload, Attachment, EmailAddress, EmailEnvelope, EmailPage, EmailPayload,
    InternalActivityKind, RawEmailMessage, RawInternalActivity, ThreadPayload, TimelineActivity,
    TimelineSource, thread_activity_id,
};
pub use providers::{
    ActivityStore, InMemoryActivityStore, InMemoryMailProvider, InMemoryPinnedStore, MailProvider,
    PinnedStore,
};
pub use sync::{ContactEmailState, EmailSyncCoordinator, SyncStatus};
pub use threading::ThreadGrouper;
pub use throttle::Throttle;
pub use transform::{transform_email, transform_internal};
