//! Concurrency properties of the session store: per-session guards
//! serialize, distinct sessions run in parallel, and removal waits for
//! in-flight work.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gamedock_plugin::{Action, GameError, GameInstance};
use gamedock_session::{SessionStore, SlotState};
use gamedock_types::{GameTypeId, SessionId, SessionMeta, UserId};

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

// =========================================================================
// Same-session serialization
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_with_session_same_id_bodies_never_overlap() {
    let store = Arc::new(SessionStore::new());
    store
        .create(meta("s1", "alice"), Box::new(Counter(0)))
        .await
        .expect("create");

    // Every body bumps `inside` on entry and drops it on exit; if two
    // bodies ever ran at once we would observe inside > 0 on entry.
    let inside = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        let inside = Arc::clone(&inside);
        let overlaps = Arc::clone(&overlaps);
        tasks.push(tokio::spawn(async move {
            store
                .with_session(&sid("s1"), |_, state| {
                    if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    if let SlotState::Live(inst) = state {
                        inst.apply_action(&Action::new(
                            "tick",
                            serde_json::Value::Null,
                        ))
                        .expect("counter never fails");
                    }
                    std::thread::sleep(Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
                .await
                .expect("session exists");
        }));
    }
    for task in tasks {
        task.await.expect("task completes");
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);

    // All 16 increments landed, none lost to a race.
    let count = store
        .with_session(&sid("s1"), |_, state| match state {
            SlotState::Live(inst) => {
                inst.render_response().expect("counter never fails")
            }
            SlotState::Poisoned => panic!("session is live"),
        })
        .await
        .expect("session exists");
    assert_eq!(count, serde_json::json!(16));
}

// =========================================================================
// Distinct-session independence
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_busy_session_does_not_block_other_sessions() {
    let store = Arc::new(SessionStore::new());
    store
        .create(meta("s1", "alice"), Box::new(Counter(0)))
        .await
        .expect("create s1");
    store
        .create(meta("s2", "bob"), Box::new(Counter(0)))
        .await
        .expect("create s2");

    // Park on s1's guard indefinitely.
    let s1 = store.get(&sid("s1")).await.expect("s1 exists");
    let _held = s1.lock().await;

    // s2 must still be reachable, promptly.
    let result = tokio::time::timeout(
        Duration::from_secs(1),
        store.with_session(&sid("s2"), |_, state| state.is_poisoned()),
    )
    .await;
    assert!(matches!(result, Ok(Ok(false))));

    // So must the map itself (lookup of the busy session's slot).
    let lookup =
        tokio::time::timeout(Duration::from_secs(1), store.get(&sid("s1")))
            .await;
    assert!(lookup.is_ok());
}

// =========================================================================
// Removal vs. in-flight work
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remove_waits_for_in_flight_invocation() {
    let store = Arc::new(SessionStore::new());
    store
        .create(meta("s1", "alice"), Box::new(Counter(0)))
        .await
        .expect("create");

    let slot = store.get(&sid("s1")).await.expect("s1 exists");
    let guard = slot.lock().await;

    // While the guard is held, removal must not complete.
    let remover = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.remove(&sid("s1")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!remover.is_finished());
    assert_eq!(store.len().await, 1);

    // Releasing the guard lets the removal through.
    drop(guard);
    let removed = remover.await.expect("remover task completes");
    assert!(removed.is_some());
    assert!(store.is_empty().await);
}
