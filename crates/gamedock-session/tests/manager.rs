//! Session lifecycle tests: creation and quotas, the invoke path with
//! its restore-or-poison policy, deletion, and the expiry sweep.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gamedock_plugin::{
    Action, CodeSource, GameError, GameFactory, GameInstance, ManifestLoader,
    PluginArtifact, PluginError, PluginRegistry,
};
use gamedock_session::{SessionConfig, SessionError, SessionManager};
use gamedock_types::{
    AuthorProfile, GameTypeDescriptor, GameTypeId, MetadataStore, SessionId,
    SessionMeta, StoreError, UserId,
};

// =========================================================================
// Test collaborators
// =========================================================================

/// Metadata store over plain maps. Only the session and game-type
/// surface matters here; the author-profile methods are inert.
#[derive(Default)]
struct MemMeta {
    game_types: Mutex<HashMap<GameTypeId, GameTypeDescriptor>>,
    sessions: Mutex<HashMap<SessionId, SessionMeta>>,
}

impl MemMeta {
    fn with_game_type(descriptor: GameTypeDescriptor) -> Self {
        let store = Self::default();
        store
            .game_types
            .lock()
            .unwrap()
            .insert(descriptor.id.clone(), descriptor);
        store
    }
}

impl MetadataStore for MemMeta {
    async fn create_game_type(
        &self,
        descriptor: GameTypeDescriptor,
    ) -> Result<(), StoreError> {
        let mut types = self.game_types.lock().unwrap();
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
        Ok(self.game_types.lock().unwrap().get(id).cloned())
    }

    async fn list_game_types(
        &self,
    ) -> Result<Vec<GameTypeDescriptor>, StoreError> {
        Ok(self.game_types.lock().unwrap().values().cloned().collect())
    }

    async fn record_play(
        &self,
        id: &GameTypeId,
        _player: &UserId,
        _now_ms: u64,
    ) -> Result<(), StoreError> {
        if let Some(d) = self.game_types.lock().unwrap().get_mut(id) {
            d.play_count += 1;
        }
        Ok(())
    }

    async fn create_session(
        &self,
        meta: SessionMeta,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
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
            .unwrap()
            .values()
            .filter(|m| m.owner == *owner)
            .cloned()
            .collect())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionMeta>, StoreError> {
        Ok(self.sessions.lock().unwrap().values().cloned().collect())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.lock().unwrap().remove(id);
        Ok(())
    }

    async fn profile(
        &self,
        _user: &UserId,
    ) -> Result<Option<AuthorProfile>, StoreError> {
        Ok(None)
    }

    async fn try_reserve_authored_slot(
        &self,
        _user: &UserId,
        _default_max: u32,
        _now_ms: u64,
    ) -> Result<u32, StoreError> {
        Ok(1)
    }

    async fn release_authored_slot(
        &self,
        _user: &UserId,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn record_authored_game(
        &self,
        _user: &UserId,
        _id: &GameTypeId,
        _now_ms: u64,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Code source that always hands back the same manifest bundle.
struct StaticSource(Vec<u8>);

impl CodeSource for StaticSource {
    async fn fetch(
        &self,
        _source_url: &str,
    ) -> Result<PluginArtifact, PluginError> {
        Ok(PluginArtifact::new(self.0.clone()))
    }
}

/// Clicker: `click` bumps a counter, `boom` raises a domain error,
/// `stall` sleeps past any reasonable deadline, `crash` panics.
struct Clicker(u64);

impl GameInstance for Clicker {
    fn apply_action(
        &mut self,
        action: &Action,
    ) -> Result<serde_json::Value, GameError> {
        match action.name.as_str() {
            "click" => {
                self.0 += 1;
                Ok(serde_json::json!({"clicks": self.0}))
            }
            "boom" => Err(GameError::new("unit not found")),
            "stall" => {
                std::thread::sleep(Duration::from_secs(30));
                Ok(serde_json::Value::Null)
            }
            "crash" => panic!("plugin bug"),
            other => Err(GameError::new(format!("unknown action {other}"))),
        }
    }

    fn render_response(&self) -> Result<serde_json::Value, GameError> {
        Ok(serde_json::json!({"clicks": self.0}))
    }
}

struct ClickerFactory;

impl GameFactory for ClickerFactory {
    fn new_instance(&self) -> Box<dyn GameInstance> {
        Box::new(Clicker(0))
    }
}

fn gid() -> GameTypeId {
    GameTypeId("clicker".into())
}

fn descriptor() -> GameTypeDescriptor {
    GameTypeDescriptor {
        id: gid(),
        name: "Clicker".into(),
        author: UserId::new("author"),
        source: "https://example.com/clicker.git".into(),
        description: "click things".into(),
        created_at_ms: 0,
        play_count: 0,
    }
}

fn manager(
    config: SessionConfig,
) -> Arc<SessionManager<StaticSource, MemMeta>> {
    let meta = Arc::new(MemMeta::with_game_type(descriptor()));
    let loader =
        ManifestLoader::new().register("clicker", Arc::new(ClickerFactory));
    let registry = Arc::new(PluginRegistry::new(
        StaticSource(br#"{"entry": "clicker"}"#.to_vec()),
        Arc::clone(&meta),
        Arc::new(loader),
    ));
    Arc::new(SessionManager::new(registry, meta, config))
}

fn alice() -> UserId {
    UserId::new("alice")
}

// =========================================================================
// Creation and quotas
// =========================================================================

#[tokio::test]
async fn test_create_session_sets_validity_window() {
    let mgr = manager(SessionConfig::default());
    let meta = mgr
        .create_session(&alice(), &gid())
        .await
        .expect("session created");

    assert_eq!(meta.owner, alice());
    assert_eq!(meta.game_type, gid());
    assert_eq!(
        meta.expires_at_ms - meta.created_at_ms,
        7 * 24 * 60 * 60 * 1000
    );
    assert_eq!(mgr.store().len().await, 1);
}

#[tokio::test]
async fn test_create_session_unknown_game_type_fails() {
    let mgr = manager(SessionConfig::default());
    let result = mgr
        .create_session(&alice(), &GameTypeId("ghost".into()))
        .await;
    assert!(matches!(
        result,
        Err(SessionError::Plugin(PluginError::NotFound(_)))
    ));
    assert!(mgr.store().is_empty().await);
}

#[tokio::test]
async fn test_create_session_over_quota_fails() {
    let mgr = manager(SessionConfig {
        max_active_sessions: 2,
        ..SessionConfig::default()
    });

    mgr.create_session(&alice(), &gid()).await.expect("first");
    mgr.create_session(&alice(), &gid()).await.expect("second");

    let result = mgr.create_session(&alice(), &gid()).await;
    assert!(matches!(
        result,
        Err(SessionError::TooManySessions { limit: 2 })
    ));

    // Another player is unaffected by alice's quota.
    mgr.create_session(&UserId::new("bob"), &gid())
        .await
        .expect("bob's first");
}

// =========================================================================
// The invoke path
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_play_applies_action_and_render_sees_it() {
    let mgr = manager(SessionConfig::default());
    let meta = mgr.create_session(&alice(), &gid()).await.expect("create");

    let out = mgr
        .play(&alice(), &meta.id, Action::new("click", serde_json::Value::Null))
        .await
        .expect("click succeeds");
    assert_eq!(out, serde_json::json!({"clicks": 1}));

    let view = mgr.render(&alice(), &meta.id).await.expect("render");
    assert_eq!(view, serde_json::json!({"clicks": 1}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_play_not_owner_is_rejected() {
    let mgr = manager(SessionConfig::default());
    let meta = mgr.create_session(&alice(), &gid()).await.expect("create");

    let result = mgr
        .play(
            &UserId::new("mallory"),
            &meta.id,
            Action::new("click", serde_json::Value::Null),
        )
        .await;
    assert!(matches!(result, Err(SessionError::NotOwner(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_play_game_error_keeps_session_usable() {
    let mgr = manager(SessionConfig::default());
    let meta = mgr.create_session(&alice(), &gid()).await.expect("create");

    let result = mgr
        .play(&alice(), &meta.id, Action::new("boom", serde_json::Value::Null))
        .await;
    assert!(matches!(result, Err(SessionError::GameFailed(_))));

    // The session survived the domain failure.
    let out = mgr
        .play(&alice(), &meta.id, Action::new("click", serde_json::Value::Null))
        .await
        .expect("still playable");
    assert_eq!(out, serde_json::json!({"clicks": 1}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_play_timeout_poisons_session() {
    let mgr = manager(SessionConfig {
        execution_timeout: Duration::from_millis(100),
        ..SessionConfig::default()
    });
    let meta = mgr.create_session(&alice(), &gid()).await.expect("create");

    let start = std::time::Instant::now();
    let result = mgr
        .play(&alice(), &meta.id, Action::new("stall", serde_json::Value::Null))
        .await;
    assert!(matches!(result, Err(SessionError::Timeout { .. })));
    // The error surfaces at the deadline, not when the stalled unit
    // eventually wakes up.
    assert!(start.elapsed() < Duration::from_secs(5));

    let result = mgr
        .play(&alice(), &meta.id, Action::new("click", serde_json::Value::Null))
        .await;
    assert!(matches!(result, Err(SessionError::Poisoned(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_play_panic_poisons_session() {
    let mgr = manager(SessionConfig::default());
    let meta = mgr.create_session(&alice(), &gid()).await.expect("create");

    let result = mgr
        .play(&alice(), &meta.id, Action::new("crash", serde_json::Value::Null))
        .await;
    assert!(matches!(result, Err(SessionError::Crashed(_))));

    let result = mgr.render(&alice(), &meta.id).await;
    assert!(matches!(result, Err(SessionError::Poisoned(_))));
}

// =========================================================================
// Deletion and expiry
// =========================================================================

#[tokio::test]
async fn test_delete_session_owner_only() {
    let mgr = manager(SessionConfig::default());
    let meta = mgr.create_session(&alice(), &gid()).await.expect("create");

    let result = mgr.delete_session(&UserId::new("mallory"), &meta.id).await;
    assert!(matches!(result, Err(SessionError::NotOwner(_))));

    mgr.delete_session(&alice(), &meta.id)
        .await
        .expect("owner deletes");
    let result = mgr.render(&alice(), &meta.id).await;
    assert!(matches!(result, Err(SessionError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_expire_sessions_removes_only_expired() {
    let mgr = manager(SessionConfig {
        session_validity: Duration::ZERO,
        ..SessionConfig::default()
    });
    // Zero validity: the session is expired the instant it exists.
    let expired = mgr.create_session(&alice(), &gid()).await.expect("create");

    let removed = mgr.expire_sessions().await.expect("sweep");
    assert_eq!(removed, vec![expired.id.clone()]);
    assert!(mgr.store().is_empty().await);

    let result = mgr.render(&alice(), &expired.id).await;
    assert!(matches!(result, Err(SessionError::NotFound(_))));

    // Sweeping again finds nothing: idempotent.
    let removed = mgr.expire_sessions().await.expect("second sweep");
    assert!(removed.is_empty());
}

#[tokio::test]
async fn test_expired_sessions_do_not_count_against_quota() {
    let mgr = manager(SessionConfig {
        max_active_sessions: 1,
        session_validity: Duration::ZERO,
        ..SessionConfig::default()
    });

    // The first session expires immediately, so the second creation
    // must succeed even without a sweep in between.
    mgr.create_session(&alice(), &gid()).await.expect("first");
    mgr.create_session(&alice(), &gid()).await.expect("second");
}
