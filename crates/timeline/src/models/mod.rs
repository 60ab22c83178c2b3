//! Domain models for the timeline engine

mod activity;
mod email;
mod timeline;

pub use activity::{EmailEnvelope, InternalActivityKind, RawInternalActivity};
pub use email::{Attachment, EmailAddress, EmailPage, RawEmailMessage};
pub use timeline::{
    ActivityPayload, EmailPayload, ThreadPayload, TimelineActivity, TimelineSource,
    thread_activity_id,
};
