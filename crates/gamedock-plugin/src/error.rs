//! Error types for plugin resolution and loading.

use gamedock_types::GameTypeId;

/// Errors that can occur while resolving a game type to a factory.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// No approved game type with this id.
    #[error("game type {0} not found")]
    NotFound(GameTypeId),

    /// The descriptor's source location failed syntactic validation.
    /// Caught before any fetch is attempted.
    #[error("invalid source location: {0}")]
    InvalidSource(String),

    /// Fetching or loading the backing code failed: network error,
    /// missing repository, malformed bundle, unknown entry point.
    /// Not retried by the registry — retry policy belongs to the caller.
    #[error("failed to load plugin code: {0}")]
    LoadFailed(String),

    /// The metadata store failed while looking up the descriptor.
    #[error(transparent)]
    Store(#[from] gamedock_types::StoreError),
}
