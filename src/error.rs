//! Error types surfaced to game code

use thiserror::Error;

use crate::engine::ObjectId;

/// Misuse of the deferred add/remove queues.
///
/// The offending request is dropped; the tick continues normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("object {0} is already queued for removal")]
    AlreadyQueued(ObjectId),
}

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
