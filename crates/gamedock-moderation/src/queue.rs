//! The moderation queue: the only path by which a game type becomes
//! playable.
//!
//! A proposal enters as a [`ProposedGame`], gets validated and charged
//! against the author's quota, and waits in the pending map with a
//! secret decision token. A moderator holding the token then approves
//! (descriptor persisted, game becomes resolvable) or declines (quota
//! slot released). Every proposal reaches exactly one of those two
//! outcomes.
//!
//! # Decision races
//!
//! Approve and decline both start with one existence-and-token check
//! plus removal under a single critical section of the pending map's
//! lock. Two concurrent decisions for the same proposal therefore
//! cannot both succeed: the loser finds the entry gone and gets
//! [`ModerationError::NotFound`]. The lock is never held across an
//! await — store calls happen strictly after the entry is out.

use std::collections::HashMap;
use std::sync::Arc;

use gamedock_types::{
    GameTypeDescriptor, GameTypeId, MetadataStore, StoreError, UserId,
    now_millis, validate_source_url,
};
use rand::Rng;
use tokio::sync::Mutex;

use crate::{ModerationConfig, ModerationError, ModerationNotifier};

/// What an author submits: everything a descriptor needs except the
/// parts the system assigns (id, timestamps, play count).
#[derive(Debug, Clone)]
pub struct ProposedGame {
    pub name: String,
    pub source: String,
    pub description: String,
}

/// A proposal waiting for a moderator's decision.
#[derive(Debug, Clone)]
pub struct PendingGameType {
    /// The descriptor-to-be, id already assigned.
    pub descriptor: GameTypeDescriptor,

    /// The secret that authenticates the decision. Shared only with
    /// moderators, via the notification message.
    pub token: String,
}

/// Generates a random 32-character hex decision token (128 bits).
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Accepts, holds, and decides game type proposals.
///
/// Shared process-wide behind an `Arc`; all methods take `&self`.
pub struct ModerationQueue<M: MetadataStore, N: ModerationNotifier> {
    meta: Arc<M>,
    notifier: N,
    config: ModerationConfig,

    /// Proposals awaiting a decision, keyed by their assigned id. The
    /// lock guards single check-then-act critical sections and is never
    /// held across an await.
    pending: Mutex<HashMap<GameTypeId, PendingGameType>>,
}

impl<M: MetadataStore, N: ModerationNotifier> ModerationQueue<M, N> {
    pub fn new(meta: Arc<M>, notifier: N, config: ModerationConfig) -> Self {
        Self {
            meta,
            notifier,
            config,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Submits a new game type proposal on behalf of `author`.
    ///
    /// Validates the source URL, atomically charges the author's quota,
    /// assigns the id and decision token, and notifies the moderators.
    /// A failed notification does not fail the proposal.
    ///
    /// # Errors
    /// - [`ModerationError::InvalidSource`] — malformed source URL;
    ///   nothing was reserved.
    /// - [`ModerationError::QuotaExceeded`] — the author is at their
    ///   authoring limit.
    pub async fn propose(
        &self,
        author: &UserId,
        proposal: ProposedGame,
    ) -> Result<PendingGameType, ModerationError> {
        validate_source_url(&proposal.source)
            .map_err(ModerationError::InvalidSource)?;

        let now = now_millis();
        match self
            .meta
            .try_reserve_authored_slot(author, self.config.max_authored_games, now)
            .await
        {
            Ok(_count) => {}
            Err(StoreError::QuotaExhausted { limit }) => {
                return Err(ModerationError::QuotaExceeded { limit });
            }
            Err(e) => return Err(e.into()),
        }

        let pending = PendingGameType {
            descriptor: GameTypeDescriptor {
                id: GameTypeId::generate(),
                name: proposal.name,
                author: author.clone(),
                source: proposal.source,
                description: proposal.description,
                created_at_ms: now,
                play_count: 0,
            },
            token: generate_token(),
        };

        {
            let mut map = self.pending.lock().await;
            map.insert(pending.descriptor.id.clone(), pending.clone());
        }
        tracing::info!(
            game_type = %pending.descriptor.id,
            %author,
            "game type proposed"
        );

        if let Err(e) = self.notifier.notify(&pending).await {
            tracing::warn!(
                game_type = %pending.descriptor.id,
                error = %e,
                "moderator notification failed, proposal stays pending"
            );
        }

        Ok(pending)
    }

    /// Approves a pending proposal: the descriptor is persisted and the
    /// game type becomes resolvable by players.
    ///
    /// # Errors
    /// - [`ModerationError::NotFound`] — no such pending proposal
    ///   (includes losing a decision race).
    /// - [`ModerationError::WrongToken`] — bad token; the proposal
    ///   stays pending.
    pub async fn approve(
        &self,
        id: &GameTypeId,
        token: &str,
    ) -> Result<GameTypeDescriptor, ModerationError> {
        let pending = self.take_pending(id, token).await?;

        // The descriptor's timestamp is its approval time.
        let now = now_millis();
        let mut descriptor = pending.descriptor.clone();
        descriptor.created_at_ms = now;

        if let Err(e) = self.meta.create_game_type(descriptor.clone()).await {
            // Put the proposal back so the decision can be retried once
            // the store recovers.
            let mut map = self.pending.lock().await;
            map.insert(id.clone(), pending);
            return Err(e.into());
        }

        // Profile bookkeeping is best-effort: the game is already live.
        if let Err(e) = self
            .meta
            .record_authored_game(&descriptor.author, id, now)
            .await
        {
            tracing::warn!(
                game_type = %id,
                error = %e,
                "failed to record authored game"
            );
        }

        tracing::info!(
            game_type = %id,
            author = %descriptor.author,
            "game type approved"
        );
        Ok(descriptor)
    }

    /// Declines a pending proposal and releases the author's quota
    /// slot.
    ///
    /// # Errors
    /// Same id/token rules as [`approve`](Self::approve).
    pub async fn decline(
        &self,
        id: &GameTypeId,
        token: &str,
    ) -> Result<(), ModerationError> {
        let pending = self.take_pending(id, token).await?;

        self.meta
            .release_authored_slot(&pending.descriptor.author)
            .await?;

        tracing::info!(
            game_type = %id,
            author = %pending.descriptor.author,
            "game type declined"
        );
        Ok(())
    }

    /// The existence-and-token check plus removal, in one critical
    /// section. A wrong token leaves the entry in place.
    async fn take_pending(
        &self,
        id: &GameTypeId,
        token: &str,
    ) -> Result<PendingGameType, ModerationError> {
        let mut map = self.pending.lock().await;
        let entry = map.get(id).ok_or_else(|| {
            ModerationError::NotFound(id.clone())
        })?;
        if entry.token != token {
            return Err(ModerationError::WrongToken);
        }
        // Checked above; the entry is still there.
        map.remove(id)
            .ok_or_else(|| ModerationError::NotFound(id.clone()))
    }

    /// A snapshot of one pending proposal, if it is still undecided.
    pub async fn pending(&self, id: &GameTypeId) -> Option<PendingGameType> {
        self.pending.lock().await.get(id).cloned()
    }

    /// Number of proposals awaiting a decision.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}
