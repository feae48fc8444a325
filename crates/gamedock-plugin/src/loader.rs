//! Turning a fetched artifact into an invokable factory.
//!
//! Gamedock uses a compiled-in registry of game factories rather than
//! loading native code at runtime: dynamic loading of untrusted code
//! without a real sandbox would hand plugins the whole process. A
//! fetched bundle instead carries a small JSON manifest naming the
//! entry point it wants, and the [`ManifestLoader`] maps that name onto
//! a factory that was linked into the server at build time.
//!
//! The [`PluginLoader`] trait keeps the seam open: a deployment that
//! does have a sandbox (WASM, a jailed subprocess) can substitute its
//! own loader without touching the registry.

use std::collections::HashMap;
use std::sync::Arc;

use gamedock_types::GameTypeId;
use serde::Deserialize;

use crate::{GameFactory, PluginArtifact, PluginError, SharedFactory};

/// Converts a fetched artifact into a usable factory.
///
/// Object-safe on purpose — the registry stores a `Arc<dyn
/// PluginLoader>` so loaders can be swapped at wiring time.
pub trait PluginLoader: Send + Sync + 'static {
    /// Interprets `artifact` and produces the factory for `id`.
    ///
    /// # Errors
    /// [`PluginError::LoadFailed`] for anything wrong with the bundle:
    /// malformed manifest, unknown entry point, unsupported version.
    fn load(
        &self,
        id: &GameTypeId,
        artifact: &PluginArtifact,
    ) -> Result<SharedFactory, PluginError>;
}

/// The manifest a code bundle must contain.
#[derive(Debug, Deserialize)]
struct PluginManifest {
    /// Name of the compiled-in entry point this bundle binds to.
    entry: String,
}

/// A [`PluginLoader`] backed by statically registered factories.
///
/// Game crates register their factories under an entry-point name at
/// server wiring time; a bundle's manifest then selects one by name.
pub struct ManifestLoader {
    entries: HashMap<String, SharedFactory>,
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a factory under an entry-point name. Later
    /// registrations for the same name replace earlier ones.
    pub fn register(
        mut self,
        entry: impl Into<String>,
        factory: Arc<dyn GameFactory>,
    ) -> Self {
        self.entries.insert(entry.into(), factory);
        self
    }

    /// Entry-point names currently registered (for diagnostics).
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginLoader for ManifestLoader {
    fn load(
        &self,
        id: &GameTypeId,
        artifact: &PluginArtifact,
    ) -> Result<SharedFactory, PluginError> {
        let manifest: PluginManifest =
            serde_json::from_slice(&artifact.bytes).map_err(|e| {
                PluginError::LoadFailed(format!(
                    "malformed plugin manifest for {id}: {e}"
                ))
            })?;

        let factory = self.entries.get(&manifest.entry).ok_or_else(|| {
            PluginError::LoadFailed(format!(
                "unknown entry point {:?} for game type {id}",
                manifest.entry
            ))
        })?;

        tracing::debug!(%id, entry = %manifest.entry, "plugin loaded");
        Ok(Arc::clone(factory))
    }
}

// =========================================================================
// Tests
// =========================================================================
