//! Plugin loading and the game-logic seam for Gamedock.
//!
//! This crate owns everything between "a game type id" and "a live game
//! instance":
//!
//! 1. **The seam** — [`GameInstance`] / [`GameFactory`], the traits game
//!    authors implement.
//! 2. **Fetching** — the [`CodeSource`] boundary delivering
//!    [`PluginArtifact`] bundles from a source URL.
//! 3. **Loading** — the [`PluginLoader`] seam and the default
//!    [`ManifestLoader`] (compiled-in factories selected by a bundle
//!    manifest).
//! 4. **The registry** — [`PluginRegistry`], process-wide, append-only,
//!    single-flight per id.
//!
//! # How it fits in the stack
//!
//! ```text
//! gamedock-session (above)  ← asks the registry for factories at
//!     ↕                       session creation
//! gamedock-plugin (this crate)
//!     ↕
//! gamedock-types (below)    ← ids, descriptors, source validation
//! ```

#![allow(async_fn_in_trait)]

mod artifact;
mod error;
mod loader;
mod logic;
mod registry;

pub use artifact::{CodeSource, PluginArtifact};
pub use error::PluginError;
pub use loader::{ManifestLoader, PluginLoader};
pub use logic::{Action, GameError, GameFactory, GameInstance, SharedFactory};
pub use registry::{GameCatalog, PluginRegistry};
