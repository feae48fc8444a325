//! The in-memory session store: one live game instance per session id,
//! each behind its own exclusive-access guard.
//!
//! # Locking model
//!
//! Two levels, with strictly disjoint jobs:
//!
//! - An outer `tokio::sync::RwLock` guards the *shape* of the map
//!   (insert/remove/lookup). It is held only for map operations, never
//!   across an `.await` on a slot.
//! - Each slot carries its own `tokio::sync::Mutex` — the per-session
//!   guard. Holding it is the one and only license to touch that
//!   session's game instance. A slow plugin invocation for one session
//!   therefore blocks *only* callers of that same session; unrelated
//!   sessions never queue behind it.
//!
//! Lookups clone the slot's `Arc` and release the map lock *before*
//! awaiting the slot guard, so the map stays available while any number
//! of sessions are busy. Removal takes the slot guard first, which is
//! what lets the expiry sweep run concurrently with live traffic: it
//! can never yank an instance out from under a running invocation.

use std::collections::HashMap;
use std::sync::Arc;

use gamedock_plugin::GameInstance;
use gamedock_types::{SessionId, SessionMeta, UserId};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::SessionError;

/// What lives behind a session's guard.
pub enum SlotState {
    /// The session's live, mutable game instance.
    Live(Box<dyn GameInstance>),

    /// Tombstone left after a timeout or crash. The instance is gone
    /// (still owned by an abandoned execution unit, which can never
    /// reach back in here); the owner must create a new session.
    Poisoned,
}

impl SlotState {
    pub fn is_poisoned(&self) -> bool {
        matches!(self, Self::Poisoned)
    }
}

/// One session's entry: immutable metadata plus the guarded instance.
pub struct SessionSlot {
    meta: SessionMeta,
    state: Mutex<SlotState>,
}

impl SessionSlot {
    /// The session's metadata (never changes after creation).
    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    /// Acquires the session's exclusive-access guard.
    ///
    /// Waiters are served in FIFO order by the tokio mutex, which gives
    /// the starvation-freedom the store promises. The worst-case wait
    /// is bounded by the previous holder's execution deadline.
    pub async fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().await
    }
}

/// The process-wide map from session id to live slot.
///
/// Owns every live game instance exclusively: the only way to touch an
/// instance is through [`SessionStore::with_session`] or an explicit
/// [`SessionSlot::lock`], both of which go through the per-session
/// guard.
pub struct SessionStore {
    slots: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Materializes a new session with its live instance.
    ///
    /// # Errors
    /// [`SessionError::Duplicate`] if the id already exists.
    pub async fn create(
        &self,
        meta: SessionMeta,
        instance: Box<dyn GameInstance>,
    ) -> Result<(), SessionError> {
        let mut slots = self.slots.write().await;
        if slots.contains_key(&meta.id) {
            return Err(SessionError::Duplicate(meta.id));
        }

        let id = meta.id.clone();
        slots.insert(
            id.clone(),
            Arc::new(SessionSlot {
                meta,
                state: Mutex::new(SlotState::Live(instance)),
            }),
        );
        tracing::info!(session_id = %id, "session materialized");
        Ok(())
    }

    /// Looks up a session's slot.
    ///
    /// The map lock is released before this returns — callers then
    /// await the slot's own guard without blocking the store.
    pub async fn get(
        &self,
        id: &SessionId,
    ) -> Result<Arc<SessionSlot>, SessionError> {
        let slots = self.slots.read().await;
        slots
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    /// Runs `f` against the session's state under its exclusive guard.
    ///
    /// The guard is released on every exit path — including a panic in
    /// `f` — because it is an RAII guard dropped when this frame
    /// unwinds.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the id is absent.
    pub async fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&SessionMeta, &mut SlotState) -> T,
    ) -> Result<T, SessionError> {
        let slot = self.get(id).await?;
        let mut state = slot.lock().await;
        Ok(f(slot.meta(), &mut state))
    }

    /// Removes a session, waiting for its guard first so a running
    /// invocation always finishes before the slot disappears.
    ///
    /// Returns the metadata if the session existed. Removing an absent
    /// id is a no-op — the expiry sweep must be idempotent.
    pub async fn remove(&self, id: &SessionId) -> Option<SessionMeta> {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(id).cloned()
        }?;

        // Wait out any in-flight invocation, then delete while still
        // holding the guard so no new invocation can slip in between.
        let guard = slot.lock().await;
        let removed = {
            let mut slots = self.slots.write().await;
            slots.remove(id)
        };
        drop(guard);

        if removed.is_some() {
            tracing::info!(session_id = %id, "session removed");
        }
        removed.map(|slot| slot.meta.clone())
    }

    /// Ids of all live sessions owned by `owner`.
    pub async fn ids_for_owner(&self, owner: &UserId) -> Vec<SessionId> {
        let slots = self.slots.read().await;
        slots
            .values()
            .filter(|slot| slot.meta.owner == *owner)
            .map(|slot| slot.meta.id.clone())
            .collect()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use gamedock_plugin::{Action, GameError};
    use gamedock_types::GameTypeId;

    use super::*;

    /// A game whose state is a single counter.
    struct Counter(u64);

    impl GameInstance for Counter {
        fn apply_action(
            &mut self,
            _action: &Action,
        ) -> Result<serde_json::Value, GameError> {
            self.0 += 1;
            Ok(serde_json::json!(self.0))
        }

        fn render_response(&self) -> Result<serde_json::Value, GameError> {
            Ok(serde_json::json!(self.0))
        }
    }

    fn meta(id: &str, owner: &str) -> SessionMeta {
        SessionMeta {
            id: SessionId(id.into()),
            owner: UserId::new(owner),
            game_type: GameTypeId("g".into()),
            created_at_ms: 0,
            expires_at_ms: u64::MAX,
        }
    }

    fn sid(id: &str) -> SessionId {
        SessionId(id.into())
    }

    #[tokio::test]
    async fn test_create_then_with_session_sees_instance() {
        let store = SessionStore::new();
        store
            .create(meta("s1", "alice"), Box::new(Counter(0)))
            .await
            .expect("create");

        let value = store
            .with_session(&sid("s1"), |_, state| match state {
                SlotState::Live(inst) => inst
                    .apply_action(&Action::new("tick", serde_json::Value::Null))
                    .expect("counter never fails"),
                SlotState::Poisoned => panic!("fresh session is live"),
            })
            .await
            .expect("session exists");

        assert_eq!(value, serde_json::json!(1));
    }

    #[tokio::test]
    async fn test_create_duplicate_id_returns_duplicate() {
        let store = SessionStore::new();
        store
            .create(meta("s1", "alice"), Box::new(Counter(0)))
            .await
            .expect("first create");

        let result = store
            .create(meta("s1", "bob"), Box::new(Counter(0)))
            .await;
        assert!(matches!(result, Err(SessionError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_with_session_unknown_id_returns_not_found() {
        let store = SessionStore::new();
        let result = store.with_session(&sid("ghost"), |_, _| ()).await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = SessionStore::new();
        store
            .create(meta("s1", "alice"), Box::new(Counter(0)))
            .await
            .expect("create");

        assert!(store.remove(&sid("s1")).await.is_some());
        assert!(store.remove(&sid("s1")).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_ids_for_owner_filters_by_owner() {
        let store = SessionStore::new();
        store
            .create(meta("s1", "alice"), Box::new(Counter(0)))
            .await
            .expect("create s1");
        store
            .create(meta("s2", "bob"), Box::new(Counter(0)))
            .await
            .expect("create s2");
        store
            .create(meta("s3", "alice"), Box::new(Counter(0)))
            .await
            .expect("create s3");

        let mut alice = store.ids_for_owner(&UserId::new("alice")).await;
        alice.sort();
        assert_eq!(alice, vec![sid("s1"), sid("s3")]);
    }

    #[tokio::test]
    async fn test_poisoned_state_is_observable() {
        let store = SessionStore::new();
        store
            .create(meta("s1", "alice"), Box::new(Counter(0)))
            .await
            .expect("create");

        store
            .with_session(&sid("s1"), |_, state| {
                *state = SlotState::Poisoned;
            })
            .await
            .expect("session exists");

        let poisoned = store
            .with_session(&sid("s1"), |_, state| state.is_poisoned())
            .await
            .expect("session exists");
        assert!(poisoned);
    }
}
