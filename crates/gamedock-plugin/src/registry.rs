//! The process-wide plugin registry.
//!
//! Resolves a game type id to a loaded, invokable factory. The first
//! resolution of an id fetches the backing code from the descriptor's
//! source location and loads it; every later resolution reuses the
//! cached factory. Ids are never unloaded at runtime — the registry is
//! append-only.
//!
//! # Single-flight
//!
//! Two requests racing to resolve the same not-yet-loaded id must not
//! trigger two fetches. Each id gets its own `tokio::sync::OnceCell`:
//! `get_or_try_init` runs the fetch exactly once while every other
//! caller parks on the cell, and — crucially — a *failed* fetch leaves
//! the cell empty. Failures are surfaced, never cached and never
//! retried by the registry itself; a caller that retries gets a fresh
//! attempt. Different ids live in different cells, so resolutions for
//! different game types never wait on each other.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use gamedock_types::{
    GameTypeDescriptor, GameTypeId, MetadataStore, validate_source_url,
};
use tokio::sync::{Mutex, OnceCell};

use crate::{CodeSource, PluginError, PluginLoader, SharedFactory};

/// Read access to the approved game type catalog.
///
/// This is the narrow slice of the metadata store the registry needs:
/// "is there an approved descriptor for this id, and where is its
/// code?". Implemented for every [`MetadataStore`] via the blanket impl
/// below; tests implement it directly with a map.
pub trait GameCatalog: Send + Sync + 'static {
    /// Looks up an approved descriptor. `Ok(None)` means the id is
    /// unknown (or not yet approved — indistinguishable by design).
    fn descriptor(
        &self,
        id: &GameTypeId,
    ) -> impl Future<Output = Result<Option<GameTypeDescriptor>, PluginError>> + Send;
}

impl<M: MetadataStore> GameCatalog for M {
    async fn descriptor(
        &self,
        id: &GameTypeId,
    ) -> Result<Option<GameTypeDescriptor>, PluginError> {
        Ok(self.game_type(id).await?)
    }
}

/// Resolves game type ids to loaded factories, fetching and caching
/// backing code on first use.
///
/// Shared process-wide behind an `Arc`; all methods take `&self`.
pub struct PluginRegistry<S: CodeSource, C: GameCatalog> {
    source: S,
    catalog: Arc<C>,
    loader: Arc<dyn PluginLoader>,

    /// One load cell per game type id. The outer mutex only guards map
    /// shape (insert-a-cell) and is never held across an await; the
    /// cells themselves serialize the actual fetch+load per id.
    cells: Mutex<HashMap<GameTypeId, Arc<OnceCell<SharedFactory>>>>,
}

impl<S: CodeSource, C: GameCatalog> PluginRegistry<S, C> {
    pub fn new(
        source: S,
        catalog: Arc<C>,
        loader: Arc<dyn PluginLoader>,
    ) -> Self {
        Self {
            source,
            catalog,
            loader,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves `id` to a factory capable of producing fresh game
    /// instances.
    ///
    /// # Errors
    /// - [`PluginError::NotFound`] — no approved game type with this id.
    /// - [`PluginError::InvalidSource`] — the descriptor's source URL is
    ///   malformed; failed fast, nothing was fetched.
    /// - [`PluginError::LoadFailed`] — fetch or load failed. Not cached:
    ///   the caller may retry by resolving again.
    pub async fn resolve(
        &self,
        id: &GameTypeId,
    ) -> Result<SharedFactory, PluginError> {
        let descriptor = self
            .catalog
            .descriptor(id)
            .await?
            .ok_or_else(|| PluginError::NotFound(id.clone()))?;

        validate_source_url(&descriptor.source)
            .map_err(PluginError::InvalidSource)?;

        let cell = {
            let mut cells = self.cells.lock().await;
            Arc::clone(cells.entry(id.clone()).or_default())
        };

        let factory = cell
            .get_or_try_init(|| async {
                tracing::info!(
                    %id,
                    source = %descriptor.source,
                    "fetching plugin code"
                );
                let artifact = self.source.fetch(&descriptor.source).await?;
                let factory = self.loader.load(id, &artifact)?;
                tracing::info!(%id, "plugin loaded and cached");
                Ok::<_, PluginError>(factory)
            })
            .await?;

        Ok(Arc::clone(factory))
    }

    /// `true` if this id's code is already fetched and loaded.
    pub async fn is_loaded(&self, id: &GameTypeId) -> bool {
        let cells = self.cells.lock().await;
        cells.get(id).is_some_and(|cell| cell.initialized())
    }
}
