//! Error types for the timeline engine

use thiserror::Error;

/// Errors surfaced by the engine's own operations
///
/// Provider failures during sync never appear here; the coordinator
/// converts them into `SyncStatus::Failed` at the call boundary so the
/// merge path stays exception-free.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The internal-activity collaborator failed to read
    #[error("failed to load activities")]
    ActivityLoad(#[source] anyhow::Error),

    /// A mail-provider fetch failed for a contact
    #[error("email fetch failed for {contact}")]
    EmailFetch {
        contact: String,
        #[source]
        source: anyhow::Error,
    },
}
