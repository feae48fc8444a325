//! The remote code source boundary.
//!
//! Fetching a game's backing code is an external collaborator's job
//! (git, an artifact registry, object storage, …). The registry only
//! needs one capability: "give me the bundle behind this source URL".
//! Anything that goes wrong — network failure, missing repository,
//! truncated download — is a load failure from the registry's point of
//! view.

use std::future::Future;

use crate::PluginError;

/// A fetched code bundle, exactly as the source delivered it.
///
/// The bytes are opaque here; the [`PluginLoader`](crate::PluginLoader)
/// decides what they mean.
#[derive(Debug, Clone)]
pub struct PluginArtifact {
    pub bytes: Vec<u8>,
}

impl PluginArtifact {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

/// Fetches code bundles for source locations.
///
/// The source URL has already passed syntactic validation when this is
/// called — implementations only deal with I/O, not with malformed
/// input.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` — the source is shared by every resolution
/// task the registry runs.
pub trait CodeSource: Send + Sync + 'static {
    /// Fetches the bundle behind `source_url`.
    ///
    /// # Errors
    /// Any non-success outcome maps to [`PluginError::LoadFailed`].
    fn fetch(
        &self,
        source_url: &str,
    ) -> impl Future<Output = Result<PluginArtifact, PluginError>> + Send;
}
