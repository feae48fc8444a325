//! The `Gamedock` facade: builder, wiring, and the token-authenticated
//! operation surface.
//!
//! This is the entry point for embedding the runtime. It ties together
//! all the layers: identity → moderation → plugin registry → sessions,
//! over one durable metadata store.

use std::sync::Arc;
use std::time::Duration;

use gamedock_moderation::{
    ModerationConfig, ModerationNotifier, ModerationQueue, PendingGameType,
    ProposedGame,
};
use gamedock_plugin::{Action, CodeSource, PluginLoader, PluginRegistry};
use gamedock_session::{SessionConfig, SessionManager};
use gamedock_types::{
    AuthorProfile, GameTypeDescriptor, GameTypeId, MetadataStore, SessionId,
    SessionMeta, UserId,
};

use crate::{GamedockError, Identity, IdentityProvider};

/// Aggregated configuration for the whole runtime.
#[derive(Debug, Clone)]
pub struct GamedockConfig {
    pub session: SessionConfig,
    pub moderation: ModerationConfig,

    /// How often the background sweep scans for expired sessions.
    ///
    /// Default: 1 hour.
    pub sweep_interval: Duration,
}

impl Default for GamedockConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            moderation: ModerationConfig::default(),
            sweep_interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Builder for configuring and wiring a [`Gamedock`] runtime.
///
/// # Example
///
/// ```rust,ignore
/// use gamedock::prelude::*;
///
/// let platform = Gamedock::builder()
///     .session_config(SessionConfig::default())
///     .build(source, meta, loader, notifier, identity);
/// ```
pub struct GamedockBuilder {
    config: GamedockConfig,
}

impl GamedockBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: GamedockConfig::default(),
        }
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Sets the moderation configuration.
    pub fn moderation_config(mut self, config: ModerationConfig) -> Self {
        self.config.moderation = config;
        self
    }

    /// Sets the expiry sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Wires the external collaborators into a ready runtime.
    pub fn build<S, M, N, I>(
        self,
        source: S,
        meta: Arc<M>,
        loader: Arc<dyn PluginLoader>,
        notifier: N,
        identity: I,
    ) -> Gamedock<S, M, N, I>
    where
        S: CodeSource,
        M: MetadataStore,
        N: ModerationNotifier,
        I: IdentityProvider,
    {
        let registry =
            Arc::new(PluginRegistry::new(source, Arc::clone(&meta), loader));
        let sessions = Arc::new(SessionManager::new(
            registry,
            Arc::clone(&meta),
            self.config.session.clone(),
        ));
        let moderation = ModerationQueue::new(
            Arc::clone(&meta),
            notifier,
            self.config.moderation.clone(),
        );

        Gamedock {
            sessions,
            moderation,
            meta,
            identity,
            config: self.config,
        }
    }
}

impl Default for GamedockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A wired Gamedock runtime.
///
/// Every operation authenticates the caller through the
/// [`IdentityProvider`] first, then dispatches to the owning layer.
/// Moderation decisions are the exception: they authenticate by
/// decision token, not caller identity.
pub struct Gamedock<S, M, N, I>
where
    S: CodeSource,
    M: MetadataStore,
    N: ModerationNotifier,
    I: IdentityProvider,
{
    sessions: Arc<SessionManager<S, M>>,
    moderation: ModerationQueue<M, N>,
    meta: Arc<M>,
    identity: I,
    config: GamedockConfig,
}

impl<S, M, N, I> Gamedock<S, M, N, I>
where
    S: CodeSource,
    M: MetadataStore,
    N: ModerationNotifier,
    I: IdentityProvider,
{
    /// Creates a new builder.
    pub fn builder() -> GamedockBuilder {
        GamedockBuilder::new()
    }

    pub fn config(&self) -> &GamedockConfig {
        &self.config
    }

    /// Resolves a caller token to a verified identity.
    pub async fn identify(
        &self,
        auth_token: &str,
    ) -> Result<Identity, GamedockError> {
        Ok(self.identity.identify(auth_token).await?)
    }

    // -- Authoring and moderation ----------------------------------------

    /// Proposes a new game type on behalf of the caller.
    ///
    /// # Errors
    /// [`GamedockError::AnonymousAuthor`] if the caller is anonymous —
    /// authoring requires a registered identity.
    pub async fn propose_game(
        &self,
        auth_token: &str,
        proposal: ProposedGame,
    ) -> Result<PendingGameType, GamedockError> {
        let identity = self.identify(auth_token).await?;
        if identity.anonymous {
            return Err(GamedockError::AnonymousAuthor);
        }
        Ok(self
            .moderation
            .propose(&identity.user_id, proposal)
            .await?)
    }

    /// Approves a pending proposal, authenticated by its decision token.
    pub async fn approve_game(
        &self,
        id: &GameTypeId,
        decision_token: &str,
    ) -> Result<GameTypeDescriptor, GamedockError> {
        Ok(self.moderation.approve(id, decision_token).await?)
    }

    /// Declines a pending proposal, authenticated by its decision token.
    pub async fn decline_game(
        &self,
        id: &GameTypeId,
        decision_token: &str,
    ) -> Result<(), GamedockError> {
        Ok(self.moderation.decline(id, decision_token).await?)
    }

    // -- Catalog ---------------------------------------------------------

    /// All approved game types, playable by anyone.
    pub async fn list_game_types(
        &self,
    ) -> Result<Vec<GameTypeDescriptor>, GamedockError> {
        Ok(self.meta.list_game_types().await?)
    }

    /// One approved game type, if it exists.
    pub async fn game_type(
        &self,
        id: &GameTypeId,
    ) -> Result<Option<GameTypeDescriptor>, GamedockError> {
        Ok(self.meta.game_type(id).await?)
    }

    /// The caller's author profile, if they have authored anything.
    pub async fn profile(
        &self,
        auth_token: &str,
    ) -> Result<Option<AuthorProfile>, GamedockError> {
        let identity = self.identify(auth_token).await?;
        Ok(self.meta.profile(&identity.user_id).await?)
    }

    // -- Sessions --------------------------------------------------------

    /// Creates a session of `game_type` owned by the caller. Open to
    /// anonymous identities.
    pub async fn create_session(
        &self,
        auth_token: &str,
        game_type: &GameTypeId,
    ) -> Result<SessionMeta, GamedockError> {
        let identity = self.identify(auth_token).await?;
        Ok(self
            .sessions
            .create_session(&identity.user_id, game_type)
            .await?)
    }

    /// Applies an action to the caller's session.
    pub async fn play(
        &self,
        auth_token: &str,
        session: &SessionId,
        action: Action,
    ) -> Result<serde_json::Value, GamedockError> {
        let identity = self.identify(auth_token).await?;
        Ok(self
            .sessions
            .play(&identity.user_id, session, action)
            .await?)
    }

    /// Renders the caller's session.
    pub async fn render(
        &self,
        auth_token: &str,
        session: &SessionId,
    ) -> Result<serde_json::Value, GamedockError> {
        let identity = self.identify(auth_token).await?;
        Ok(self.sessions.render(&identity.user_id, session).await?)
    }

    /// Deletes the caller's session.
    pub async fn delete_session(
        &self,
        auth_token: &str,
        session: &SessionId,
    ) -> Result<(), GamedockError> {
        let identity = self.identify(auth_token).await?;
        Ok(self
            .sessions
            .delete_session(&identity.user_id, session)
            .await?)
    }

    /// Session ids owned by a user (diagnostics and tests).
    pub async fn sessions_for(&self, owner: &UserId) -> Vec<SessionId> {
        self.sessions.store().ids_for_owner(owner).await
    }

    // -- Expiry ----------------------------------------------------------

    /// Runs one expiry sweep immediately.
    pub async fn expire_sessions(
        &self,
    ) -> Result<Vec<SessionId>, GamedockError> {
        Ok(self.sessions.expire_sessions().await?)
    }

    /// Starts the periodic background expiry sweep.
    pub fn start_sweeper(&self) -> tokio::task::JoinHandle<()> {
        self.sessions.spawn_sweeper(self.config.sweep_interval)
    }
}
