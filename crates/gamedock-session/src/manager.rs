//! The session lifecycle manager: creation, play, expiry.
//!
//! This is where the layers meet. For each operation the manager:
//! 1. checks quotas/ownership against the durable metadata store,
//! 2. resolves game code through the plugin registry,
//! 3. takes the per-session guard from the [`SessionStore`],
//! 4. hands the instance to the execution engine under the deadline,
//! 5. applies the poison-on-timeout policy to whatever comes back.
//!
//! # The poisoning dance
//!
//! An invocation *moves* the instance out of the slot (leaving a
//! `Poisoned` placeholder, all while the guard is held) and into the
//! engine's execution unit. On a normal return the instance comes back
//! and is restored. On a timeout or crash nothing comes back — the
//! placeholder simply stays, the session is permanently unusable, and
//! the abandoned unit still owns the only reference to the instance so
//! it can never corrupt a later session. A *domain* failure from the
//! game (`GameError`) is not poisoning: the invocation completed, the
//! instance returns, and the session stays usable.

use std::sync::Arc;
use std::time::Duration;

use gamedock_exec::{ExecError, run_with_deadline};
use gamedock_plugin::{Action, CodeSource, PluginRegistry};
use gamedock_types::{
    GameTypeId, MetadataStore, SessionId, SessionMeta, UserId, now_millis,
};

use crate::{SessionConfig, SessionError, SessionStore, SlotState};

/// Creates, drives, and expires game sessions.
///
/// Shared process-wide behind an `Arc`; all methods take `&self`.
pub struct SessionManager<S: CodeSource, M: MetadataStore> {
    store: SessionStore,
    registry: Arc<PluginRegistry<S, M>>,
    meta: Arc<M>,
    config: SessionConfig,
}

impl<S: CodeSource, M: MetadataStore> SessionManager<S, M> {
    pub fn new(
        registry: Arc<PluginRegistry<S, M>>,
        meta: Arc<M>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            registry,
            meta,
            config,
        }
    }

    /// The in-memory store (exposed for tests and diagnostics).
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Creates a new session of `game_type` owned by `owner`.
    ///
    /// # Errors
    /// - [`SessionError::TooManySessions`] — the owner is at their
    ///   active-session limit.
    /// - [`SessionError::Plugin`] — the game type is unknown or its
    ///   code failed to load.
    pub async fn create_session(
        &self,
        owner: &UserId,
        game_type: &GameTypeId,
    ) -> Result<SessionMeta, SessionError> {
        let now = now_millis();

        // Quota: the durable store is the source of truth for who owns
        // which sessions. Expired-but-unswept rows don't count against
        // the owner.
        let active = self
            .meta
            .sessions_for_owner(owner)
            .await?
            .iter()
            .filter(|m| !m.is_expired(now))
            .count();
        if active >= self.config.max_active_sessions as usize {
            return Err(SessionError::TooManySessions {
                limit: self.config.max_active_sessions,
            });
        }

        // Resolve first: a broken game type must fail before anything
        // is allocated.
        let factory = self.registry.resolve(game_type).await?;

        let meta = SessionMeta {
            id: SessionId::generate(),
            owner: owner.clone(),
            game_type: game_type.clone(),
            created_at_ms: now,
            expires_at_ms: now
                + self.config.session_validity.as_millis() as u64,
        };

        self.store
            .create(meta.clone(), factory.new_instance())
            .await?;

        // Persist metadata; if the store rejects it, roll the live
        // instance back out so memory and storage agree.
        if let Err(e) = self.meta.create_session(meta.clone()).await {
            self.store.remove(&meta.id).await;
            return Err(e.into());
        }

        // Play bookkeeping is best-effort: a lost counter bump is not
        // worth failing a created session over.
        if let Err(e) = self.meta.record_play(game_type, owner, now).await {
            tracing::warn!(error = %e, %game_type, "failed to record play");
        }

        tracing::info!(
            session_id = %meta.id,
            %owner,
            %game_type,
            "session created"
        );
        Ok(meta)
    }

    /// Applies a player action to a session's game instance, under the
    /// session guard and the execution deadline.
    ///
    /// # Errors
    /// - [`SessionError::NotOwner`] — `caller` doesn't own the session.
    /// - [`SessionError::Poisoned`] — the session was lost earlier.
    /// - [`SessionError::Timeout`] / [`SessionError::Crashed`] — this
    ///   invocation lost the session.
    /// - [`SessionError::GameFailed`] — the game rejected the action;
    ///   the session remains usable.
    pub async fn play(
        &self,
        caller: &UserId,
        id: &SessionId,
        action: Action,
    ) -> Result<serde_json::Value, SessionError> {
        self.invoke(caller, id, move |mut instance| {
            let result = instance.apply_action(&action);
            (instance, result)
        })
        .await
    }

    /// Computes the client-facing view of a session's current state.
    ///
    /// Same guard, deadline, and poisoning rules as [`play`](Self::play)
    /// — rendering runs plugin code too.
    pub async fn render(
        &self,
        caller: &UserId,
        id: &SessionId,
    ) -> Result<serde_json::Value, SessionError> {
        self.invoke(caller, id, |instance| {
            let result = instance.render_response();
            (instance, result)
        })
        .await
    }

    /// The shared invoke path: guard → take instance → engine →
    /// restore-or-poison.
    async fn invoke<F>(
        &self,
        caller: &UserId,
        id: &SessionId,
        op: F,
    ) -> Result<serde_json::Value, SessionError>
    where
        F: FnOnce(
                Box<dyn gamedock_plugin::GameInstance>,
            ) -> (
                Box<dyn gamedock_plugin::GameInstance>,
                Result<serde_json::Value, gamedock_plugin::GameError>,
            ) + Send
            + 'static,
    {
        let slot = self.store.get(id).await?;
        if slot.meta().owner != *caller {
            return Err(SessionError::NotOwner(id.clone()));
        }

        // Exclusive guard: held for the whole invocation, so at most
        // one body runs per session at any instant. Waiters are bounded
        // by the previous holder's deadline.
        let mut state = slot.lock().await;

        // Move the instance out, leaving a tombstone. If the engine
        // never gives it back, the tombstone is already the truth.
        let instance =
            match std::mem::replace(&mut *state, SlotState::Poisoned) {
                SlotState::Live(instance) => instance,
                SlotState::Poisoned => {
                    return Err(SessionError::Poisoned(id.clone()));
                }
            };

        let deadline = self.config.execution_timeout;
        match run_with_deadline(deadline, move || op(instance)).await {
            Ok((instance, result)) => {
                *state = SlotState::Live(instance);
                drop(state);
                // A domain error is the game speaking, not a lost
                // session — the instance went back first.
                Ok(result?)
            }
            Err(ExecError::Timeout { deadline }) => {
                tracing::warn!(
                    session_id = %id,
                    ?deadline,
                    "invocation timed out, session poisoned"
                );
                Err(SessionError::Timeout { deadline })
            }
            Err(ExecError::Panicked) => {
                tracing::warn!(
                    session_id = %id,
                    "invocation crashed, session poisoned"
                );
                Err(SessionError::Crashed(id.clone()))
            }
        }
    }

    /// Explicitly deletes a session (owner only).
    pub async fn delete_session(
        &self,
        caller: &UserId,
        id: &SessionId,
    ) -> Result<(), SessionError> {
        let slot = self.store.get(id).await?;
        if slot.meta().owner != *caller {
            return Err(SessionError::NotOwner(id.clone()));
        }
        drop(slot);

        self.store.remove(id).await;
        self.meta.delete_session(id).await?;
        Ok(())
    }

    /// Sweeps out every session whose validity window has passed, from
    /// both the in-memory store and durable metadata.
    ///
    /// Idempotent and safe to run concurrently with live traffic:
    /// removal acquires each session's guard, so a session in the
    /// middle of an invocation is only removed once that invocation
    /// finishes.
    pub async fn expire_sessions(
        &self,
    ) -> Result<Vec<SessionId>, SessionError> {
        let now = now_millis();
        let mut removed = Vec::new();

        for meta in self.meta.list_sessions().await? {
            if !meta.is_expired(now) {
                continue;
            }
            self.store.remove(&meta.id).await;
            self.meta.delete_session(&meta.id).await?;
            tracing::info!(session_id = %meta.id, "session expired");
            removed.push(meta.id);
        }

        Ok(removed)
    }

    /// Spawns the periodic expiry sweep as a background task.
    ///
    /// Sweep failures are logged and the loop continues — a flaky store
    /// must not kill expiry forever.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(
                tokio::time::MissedTickBehavior::Skip,
            );
            loop {
                ticker.tick().await;
                match manager.expire_sessions().await {
                    Ok(removed) if !removed.is_empty() => {
                        tracing::info!(
                            count = removed.len(),
                            "expiry sweep removed sessions"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "expiry sweep failed");
                    }
                }
            }
        })
    }
}
