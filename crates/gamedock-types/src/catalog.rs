//! Metadata records: game type descriptors, author profiles, and
//! session metadata.
//!
//! These are the durable shapes — what the external metadata store
//! persists and what list/get queries return. None of them contain live
//! game state: a running game instance lives exclusively in the
//! in-memory session store and is never serialized.

use serde::{Deserialize, Serialize};

use crate::{GameTypeId, SessionId, UserId};

// ---------------------------------------------------------------------------
// GameTypeDescriptor
// ---------------------------------------------------------------------------

/// Identity and provenance of a pluggable game type.
///
/// Created when an author's proposal is approved. The `id` is assigned
/// at proposal time and is immutable for the descriptor's whole life.
/// Players can only see descriptors that went through moderation — a
/// descriptor existing in the store *means* it was approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTypeDescriptor {
    /// Globally unique, immutable id.
    pub id: GameTypeId,

    /// Human-facing display name.
    pub name: String,

    /// The author's principal id.
    pub author: UserId,

    /// Where the backing code lives: a fetchable archive-repository URL
    /// (e.g. `https://example.com/repo.git`). Validated syntactically
    /// before any fetch is attempted — see [`validate_source_url`].
    ///
    /// [`validate_source_url`]: crate::validate_source_url
    pub source: String,

    /// Human description shown in game listings.
    pub description: String,

    /// Unix-millisecond creation timestamp (approval time).
    pub created_at_ms: u64,

    /// How many sessions have been created from this game type.
    pub play_count: u64,
}

// ---------------------------------------------------------------------------
// AuthorProfile
// ---------------------------------------------------------------------------

/// Per-identity authoring counters and activity timestamps.
///
/// Invariant: `games_authored` never exceeds `max_games` while any of
/// the author's proposals are outstanding or approved. The count is
/// incremented when a proposal is accepted into the moderation queue
/// and decremented only when a proposal is declined — approval keeps
/// the slot occupied permanently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub user_id: UserId,

    /// Authored game types, counting both pending proposals and
    /// approved descriptors.
    pub games_authored: u32,

    /// Maximum game types this author may hold at once.
    pub max_games: u32,

    /// Ids of approved game types, in approval order.
    pub authored_game_ids: Vec<GameTypeId>,

    /// When this profile first did anything (unix ms).
    pub first_action_at_ms: u64,

    /// Last time the author played any session (unix ms, 0 = never).
    pub last_play_at_ms: u64,

    /// Last time the author proposed or got a game approved
    /// (unix ms, 0 = never).
    pub last_authored_at_ms: u64,
}

impl AuthorProfile {
    /// A fresh profile with no authored games.
    pub fn new(user_id: UserId, max_games: u32, now_ms: u64) -> Self {
        Self {
            user_id,
            games_authored: 0,
            max_games,
            authored_game_ids: Vec::new(),
            first_action_at_ms: now_ms,
            last_play_at_ms: 0,
            last_authored_at_ms: 0,
        }
    }

    /// `true` if the author has a free authoring slot.
    pub fn has_quota(&self) -> bool {
        self.games_authored < self.max_games
    }
}

// ---------------------------------------------------------------------------
// SessionMeta
// ---------------------------------------------------------------------------

/// The durable part of a game session.
///
/// Everything here survives a process restart; the live game instance
/// does not (it exists only in the in-memory session store). A restart
/// therefore loses running games but keeps the record of who owned
/// what, which the expiry sweep eventually clears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Unique, opaque, unpredictable session id.
    pub id: SessionId,

    /// The player who created (and exclusively uses) the session.
    pub owner: UserId,

    /// Which game type this session is running.
    pub game_type: GameTypeId,

    /// Unix-millisecond creation timestamp.
    pub created_at_ms: u64,

    /// When the session stops being valid: `created_at_ms` plus the
    /// configured validity window (default one week).
    pub expires_at_ms: u64,
}

impl SessionMeta {
    /// `true` once the validity window has passed.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

// =========================================================================
// Tests
// =========================================================================
