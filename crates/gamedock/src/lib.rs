//! # Gamedock
//!
//! A moderated, pluggable game session runtime.
//!
//! Gamedock hosts community-authored turn-style games: authors propose
//! game types backed by fetchable code bundles, moderators approve or
//! decline them, and players run private sessions whose game logic
//! executes under a hard deadline. The runtime is embeddable — it has
//! no network surface of its own; a host wires in its transport,
//! identity provider, and storage.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use gamedock::prelude::*;
//!
//! let platform = Gamedock::builder()
//!     .build(source, meta, loader, notifier, identity);
//!
//! let pending = platform.propose_game("alice", proposal).await?;
//! platform.approve_game(&pending.descriptor.id, &pending.token).await?;
//! let session = platform
//!     .create_session("bob", &pending.descriptor.id)
//!     .await?;
//! let outcome = platform.play("bob", &session.id, action).await?;
//! ```

mod error;
mod identity;
mod memory;
mod platform;

pub use error::GamedockError;
pub use identity::{Identity, IdentityError, IdentityProvider};
pub use memory::{LogNotifier, MemoryStore, OpenIdentity, StaticSource};
pub use platform::{Gamedock, GamedockBuilder, GamedockConfig};

/// Everything an embedding host typically needs.
pub mod prelude {
    pub use gamedock_moderation::{
        ModerationConfig, ModerationNotifier, PendingGameType, ProposedGame,
    };
    pub use gamedock_plugin::{
        Action, GameError, GameFactory, GameInstance, ManifestLoader,
        PluginLoader,
    };
    pub use gamedock_session::SessionConfig;
    pub use gamedock_types::{
        Fault, FaultCode, GameTypeDescriptor, GameTypeId, SessionId, UserId,
    };

    pub use crate::{
        Gamedock, GamedockBuilder, GamedockConfig, GamedockError, Identity,
        IdentityProvider, LogNotifier, MemoryStore, OpenIdentity,
        StaticSource,
    };
}
