//! Error types for the moderation layer.

use gamedock_types::{GameTypeId, StoreError};

/// Errors that can occur during the moderation workflow.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    /// The author already holds their maximum of pending plus approved
    /// game types.
    #[error("author quota exceeded (limit {limit})")]
    QuotaExceeded { limit: u32 },

    /// The proposal's source URL failed syntactic validation. Rejected
    /// before anything was reserved.
    #[error("invalid source url: {0}")]
    InvalidSource(String),

    /// No pending proposal with this id — never proposed, or already
    /// decided.
    #[error("no pending proposal for game type {0}")]
    NotFound(GameTypeId),

    /// The presented moderation token does not match. The proposal
    /// stays pending.
    #[error("wrong moderation token")]
    WrongToken,

    /// The durable metadata store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
