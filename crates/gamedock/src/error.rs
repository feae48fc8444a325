//! Unified error type for the Gamedock facade, and its rendering into
//! caller-visible faults.

use gamedock_moderation::ModerationError;
use gamedock_plugin::PluginError;
use gamedock_session::SessionError;
use gamedock_types::{Fault, FaultCode, StoreError};

use crate::IdentityError;

/// Top-level error that wraps all layer-specific errors.
///
/// When using the `gamedock` facade, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GamedockError {
    /// The identity provider could not verify the caller.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Anonymous players may play, but only registered identities may
    /// author game types.
    #[error("anonymous players cannot author game types")]
    AnonymousAuthor,

    /// A session-layer error (quota, ownership, execution, expiry).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A moderation-layer error (proposal, decision, token).
    #[error(transparent)]
    Moderation(#[from] ModerationError),

    /// The durable metadata store failed on a direct facade query.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GamedockError {
    /// Flattens this error into the stable-coded [`Fault`] callers see.
    ///
    /// Internal enums stay rich; this mapping is the one compatibility
    /// contract: codes may be added, never changed.
    pub fn fault(&self) -> Fault {
        Fault::new(self.fault_code(), self.to_string())
    }

    fn fault_code(&self) -> FaultCode {
        match self {
            Self::Identity(_) | Self::AnonymousAuthor => {
                FaultCode::Unauthorized
            }
            Self::Session(e) => session_code(e),
            Self::Moderation(e) => moderation_code(e),
            Self::Store(e) => store_code(e),
        }
    }
}

fn session_code(e: &SessionError) -> FaultCode {
    match e {
        SessionError::NotFound(_) => FaultCode::NotFound,
        SessionError::Duplicate(_) => FaultCode::Duplicate,
        SessionError::TooManySessions { .. } => FaultCode::QuotaExceeded,
        SessionError::NotOwner(_) => FaultCode::Unauthorized,
        // A poisoned session was lost to an earlier deadline or crash;
        // both render the same way to the caller.
        SessionError::Poisoned(_) | SessionError::Timeout { .. } => {
            FaultCode::ExecutionTimeout
        }
        SessionError::Crashed(_) | SessionError::GameFailed(_) => {
            FaultCode::ExecutionError
        }
        SessionError::Plugin(e) => plugin_code(e),
        SessionError::Store(e) => store_code(e),
    }
}

fn plugin_code(e: &PluginError) -> FaultCode {
    match e {
        PluginError::NotFound(_) => FaultCode::NotFound,
        PluginError::InvalidSource(_) => FaultCode::InvalidInput,
        PluginError::LoadFailed(_) => FaultCode::PluginLoadFailed,
        PluginError::Store(e) => store_code(e),
    }
}

fn moderation_code(e: &ModerationError) -> FaultCode {
    match e {
        ModerationError::QuotaExceeded { .. } => FaultCode::QuotaExceeded,
        ModerationError::InvalidSource(_) => FaultCode::InvalidInput,
        ModerationError::NotFound(_) => FaultCode::NotFound,
        ModerationError::WrongToken => FaultCode::Unauthorized,
        ModerationError::Store(e) => store_code(e),
    }
}

fn store_code(e: &StoreError) -> FaultCode {
    match e {
        StoreError::Duplicate(_) => FaultCode::Duplicate,
        StoreError::NotFound(_) => FaultCode::NotFound,
        StoreError::QuotaExhausted { .. } => FaultCode::QuotaExceeded,
        StoreError::Backend(_) => FaultCode::Internal,
    }
}
