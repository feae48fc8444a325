//! Error types for the session layer.

use std::time::Duration;

use gamedock_plugin::{GameError, PluginError};
use gamedock_types::{SessionId, StoreError};

/// Errors that can occur during session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session with this id (never existed, expired, or deleted).
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// A session with this id already exists.
    #[error("session {0} already exists")]
    Duplicate(SessionId),

    /// The owner is already at their active-session limit.
    #[error("too many active sessions (limit {limit})")]
    TooManySessions { limit: u32 },

    /// The caller does not own this session.
    #[error("not the owner of session {0}")]
    NotOwner(SessionId),

    /// The session's instance was lost to an earlier timeout or crash.
    /// The owner must create a new session.
    #[error("session {0} is no longer usable, create a new session")]
    Poisoned(SessionId),

    /// This invocation exceeded the execution deadline. The session is
    /// now poisoned.
    #[error("game logic exceeded its {deadline:?} deadline, session discarded")]
    Timeout { deadline: Duration },

    /// This invocation panicked. The session is now poisoned.
    #[error("game logic crashed, session {0} discarded")]
    Crashed(SessionId),

    /// The game logic rejected the action — a domain failure, not an
    /// infrastructure one. The session remains usable.
    #[error("game logic error: {0}")]
    GameFailed(#[from] GameError),

    /// Resolving the session's game type failed.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The durable metadata store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
