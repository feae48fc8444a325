//! The durable metadata store boundary.
//!
//! Gamedock doesn't implement persistence itself — that's an external
//! collaborator (Postgres, Firestore, sqlite, …). This module defines
//! the [`MetadataStore`] trait the core is written against, so that:
//! - production wires in a real database adapter,
//! - tests and the demo use the in-memory implementation from the
//!   `gamedock` facade crate.
//!
//! Only *metadata* crosses this boundary. Live game instances are
//! in-memory objects owned by the session store and are never persisted.
//!
//! # Quota atomicity
//!
//! The authored-games quota must not be a read-then-write pair — two
//! concurrent proposals could both observe "9 of 10 used" and both
//! succeed. [`MetadataStore::try_reserve_authored_slot`] is therefore a
//! single compare-and-increment the implementation must make atomic
//! (a transaction, an optimistic-retry loop, or a plain mutex for the
//! in-memory case).

use std::future::Future;

use crate::{
    AuthorProfile, GameTypeDescriptor, GameTypeId, SessionId, SessionMeta,
    UserId,
};

/// Errors surfaced by a metadata store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The id already exists (unique constraint violated on create).
    #[error("record already exists: {0}")]
    Duplicate(String),

    /// No record with the given id.
    #[error("record not found: {0}")]
    NotFound(String),

    /// An atomic quota reservation found no free slot.
    #[error("author quota exhausted (limit {limit})")]
    QuotaExhausted { limit: u32 },

    /// The backing store itself failed (connection lost, timeout, …).
    #[error("metadata store backend error: {0}")]
    Backend(String),
}

/// Durable persistence for game type, session, and profile metadata.
///
/// # Trait bounds
///
/// - `Send + Sync` → shared across Tokio tasks.
/// - `'static` → lives as long as the service.
///
/// Async methods use the explicit `impl Future + Send` form so that
/// implementations can be driven from spawned tasks.
pub trait MetadataStore: Send + Sync + 'static {
    // -- Game types ------------------------------------------------------

    /// Persists an approved game type descriptor.
    ///
    /// # Errors
    /// [`StoreError::Duplicate`] if the id already exists.
    fn create_game_type(
        &self,
        descriptor: GameTypeDescriptor,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetches a descriptor by id. `Ok(None)` means "no such game type"
    /// — only store malfunctions are errors.
    fn game_type(
        &self,
        id: &GameTypeId,
    ) -> impl Future<Output = Result<Option<GameTypeDescriptor>, StoreError>> + Send;

    /// Lists all approved game types.
    fn list_game_types(
        &self,
    ) -> impl Future<Output = Result<Vec<GameTypeDescriptor>, StoreError>> + Send;

    /// Bumps the play counter on a game type and the player's
    /// last-play timestamp. Called once per session creation.
    fn record_play(
        &self,
        id: &GameTypeId,
        player: &UserId,
        now_ms: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // -- Sessions --------------------------------------------------------

    /// Persists session metadata. The storage layer enforces global
    /// session-id uniqueness.
    ///
    /// # Errors
    /// [`StoreError::Duplicate`] on an id collision.
    fn create_session(
        &self,
        meta: SessionMeta,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All sessions owned by a player (the active-session quota check).
    fn sessions_for_owner(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<SessionMeta>, StoreError>> + Send;

    /// All persisted sessions (the expiry sweep's input).
    fn list_sessions(
        &self,
    ) -> impl Future<Output = Result<Vec<SessionMeta>, StoreError>> + Send;

    /// Deletes session metadata. Deleting an absent id is not an error
    /// — the expiry sweep must be idempotent.
    fn delete_session(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // -- Author profiles -------------------------------------------------

    /// Fetches an author profile, if one exists yet.
    fn profile(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<AuthorProfile>, StoreError>> + Send;

    /// Atomically reserves one authoring slot for `user`, creating the
    /// profile (with `default_max` as its quota) on first contact.
    ///
    /// Returns the new authored-count on success.
    ///
    /// # Errors
    /// [`StoreError::QuotaExhausted`] if every slot is taken. The check
    /// and the increment are one atomic step.
    fn try_reserve_authored_slot(
        &self,
        user: &UserId,
        default_max: u32,
        now_ms: u64,
    ) -> impl Future<Output = Result<u32, StoreError>> + Send;

    /// Atomically releases one previously reserved slot (a declined
    /// proposal frees its quota). Never drops the count below zero.
    fn release_authored_slot(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Records an approved game under the author's profile and bumps
    /// the last-authored timestamp. The slot itself was already
    /// reserved at proposal time.
    fn record_authored_game(
        &self,
        user: &UserId,
        id: &GameTypeId,
        now_ms: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
