//! In-process collaborators for tests, demos, and single-node
//! deployments: an in-memory metadata store, a canned code source, a
//! permissive identity provider, and a log-only moderation notifier.
//!
//! Production swaps each of these for a real adapter (a database, a git
//! fetcher, a token verifier, a chat bot) without touching the core.

use std::collections::HashMap;

use gamedock_moderation::{
    ModerationNotifier, NotifyError, PendingGameType, review_message,
};
use gamedock_plugin::{CodeSource, PluginArtifact, PluginError};
use gamedock_types::{
    AuthorProfile, GameTypeDescriptor, GameTypeId, MetadataStore, SessionId,
    SessionMeta, StoreError, UserId,
};
use rand::Rng;
use tokio::sync::Mutex;

use crate::{Identity, IdentityError, IdentityProvider};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A [`MetadataStore`] over plain in-memory maps.
///
/// Quota reservation holds the profile map's lock across the check and
/// the increment, which is what makes it atomic here; a database
/// adapter would use a transaction instead.
#[derive(Default)]
pub struct MemoryStore {
    game_types: Mutex<HashMap<GameTypeId, GameTypeDescriptor>>,
    sessions: Mutex<HashMap<SessionId, SessionMeta>>,
    profiles: Mutex<HashMap<UserId, AuthorProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryStore {
    async fn create_game_type(
        &self,
        descriptor: GameTypeDescriptor,
    ) -> Result<(), StoreError> {
        let mut types = self.game_types.lock().await;
        if types.contains_key(&descriptor.id) {
            return Err(StoreError::Duplicate(descriptor.id.to_string()));
        }
        types.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    async fn game_type(
        &self,
        id: &GameTypeId,
    ) -> Result<Option<GameTypeDescriptor>, StoreError> {
        Ok(self.game_types.lock().await.get(id).cloned())
    }

    async fn list_game_types(
        &self,
    ) -> Result<Vec<GameTypeDescriptor>, StoreError> {
        Ok(self.game_types.lock().await.values().cloned().collect())
    }

    async fn record_play(
        &self,
        id: &GameTypeId,
        player: &UserId,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        if let Some(descriptor) = self.game_types.lock().await.get_mut(id) {
            descriptor.play_count += 1;
        }
        if let Some(profile) = self.profiles.lock().await.get_mut(player) {
            profile.last_play_at_ms = now_ms;
        }
        Ok(())
    }

    async fn create_session(
        &self,
        meta: SessionMeta,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&meta.id) {
            return Err(StoreError::Duplicate(meta.id.to_string()));
        }
        sessions.insert(meta.id.clone(), meta);
        Ok(())
    }

    async fn sessions_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SessionMeta>, StoreError> {
        Ok(self
            .sessions
            .lock()
            .await
            .values()
            .filter(|m| m.owner == *owner)
            .cloned()
            .collect())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionMeta>, StoreError> {
        Ok(self.sessions.lock().await.values().cloned().collect())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.lock().await.remove(id);
        Ok(())
    }

    async fn profile(
        &self,
        user: &UserId,
    ) -> Result<Option<AuthorProfile>, StoreError> {
        Ok(self.profiles.lock().await.get(user).cloned())
    }

    async fn try_reserve_authored_slot(
        &self,
        user: &UserId,
        default_max: u32,
        now_ms: u64,
    ) -> Result<u32, StoreError> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles.entry(user.clone()).or_insert_with(|| {
            AuthorProfile::new(user.clone(), default_max, now_ms)
        });
        if !profile.has_quota() {
            return Err(StoreError::QuotaExhausted {
                limit: profile.max_games,
            });
        }
        profile.games_authored += 1;
        profile.last_authored_at_ms = now_ms;
        Ok(profile.games_authored)
    }

    async fn release_authored_slot(
        &self,
        user: &UserId,
    ) -> Result<(), StoreError> {
        if let Some(profile) = self.profiles.lock().await.get_mut(user) {
            profile.games_authored = profile.games_authored.saturating_sub(1);
        }
        Ok(())
    }

    async fn record_authored_game(
        &self,
        user: &UserId,
        id: &GameTypeId,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        if let Some(profile) = self.profiles.lock().await.get_mut(user) {
            profile.authored_game_ids.push(id.clone());
            profile.last_authored_at_ms = now_ms;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StaticSource
// ---------------------------------------------------------------------------

/// A [`CodeSource`] that serves one canned bundle for every source URL.
///
/// Enough for a single-node deployment where all game logic is
/// compiled in and bundles are just manifests.
pub struct StaticSource {
    artifact: PluginArtifact,
}

impl StaticSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            artifact: PluginArtifact::new(bytes.into()),
        }
    }
}

impl CodeSource for StaticSource {
    async fn fetch(
        &self,
        source_url: &str,
    ) -> Result<PluginArtifact, PluginError> {
        tracing::debug!(%source_url, "serving canned bundle");
        Ok(self.artifact.clone())
    }
}

// ---------------------------------------------------------------------------
// OpenIdentity
// ---------------------------------------------------------------------------

/// An [`IdentityProvider`] with no verification at all:
///
/// - an empty token mints a fresh anonymous guest,
/// - a `guest:<id>` token is a returning anonymous guest,
/// - anything else is a registered identity whose id *is* the token.
///
/// For tests and demos only.
pub struct OpenIdentity;

impl IdentityProvider for OpenIdentity {
    async fn identify(
        &self,
        auth_token: &str,
    ) -> Result<Identity, IdentityError> {
        if auth_token.is_empty() {
            let guest: u32 = rand::rng().random();
            return Ok(Identity::anonymous(UserId::new(format!(
                "guest:{guest:08x}"
            ))));
        }
        if let Some(guest) = auth_token.strip_prefix("guest:") {
            if guest.is_empty() {
                return Err(IdentityError("empty guest id".into()));
            }
            return Ok(Identity::anonymous(UserId::new(auth_token)));
        }
        Ok(Identity::registered(UserId::new(auth_token)))
    }
}

// ---------------------------------------------------------------------------
// LogNotifier
// ---------------------------------------------------------------------------

/// A [`ModerationNotifier`] that writes the review message to the log
/// instead of delivering it anywhere.
pub struct LogNotifier;

impl ModerationNotifier for LogNotifier {
    async fn notify(
        &self,
        pending: &PendingGameType,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            game_type = %pending.descriptor.id,
            "moderation required:\n{}",
            review_message(pending)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_identity_empty_token_is_anonymous() {
        let id = OpenIdentity.identify("").await.expect("identify");
        assert!(id.anonymous);
        assert!(id.user_id.as_str().starts_with("guest:"));
    }

    #[tokio::test]
    async fn test_open_identity_guest_token_is_stable_and_anonymous() {
        let id = OpenIdentity.identify("guest:42").await.expect("identify");
        assert!(id.anonymous);
        assert_eq!(id.user_id, UserId::new("guest:42"));
    }

    #[tokio::test]
    async fn test_open_identity_token_becomes_user_id() {
        let id = OpenIdentity.identify("alice").await.expect("identify");
        assert!(!id.anonymous);
        assert_eq!(id.user_id, UserId::new("alice"));
    }

    #[tokio::test]
    async fn test_memory_store_quota_is_charged_and_released() {
        let store = MemoryStore::new();
        let alice = UserId::new("alice");

        assert_eq!(
            store
                .try_reserve_authored_slot(&alice, 2, 0)
                .await
                .expect("first slot"),
            1
        );
        assert_eq!(
            store
                .try_reserve_authored_slot(&alice, 2, 0)
                .await
                .expect("second slot"),
            2
        );
        assert!(matches!(
            store.try_reserve_authored_slot(&alice, 2, 0).await,
            Err(StoreError::QuotaExhausted { limit: 2 })
        ));

        store.release_authored_slot(&alice).await.expect("release");
        assert_eq!(
            store
                .try_reserve_authored_slot(&alice, 2, 0)
                .await
                .expect("slot free again"),
            2
        );
    }

    #[tokio::test]
    async fn test_memory_store_delete_session_is_idempotent() {
        let store = MemoryStore::new();
        let ghost = SessionId("ghost".into());
        store.delete_session(&ghost).await.expect("no-op delete");
    }
}
