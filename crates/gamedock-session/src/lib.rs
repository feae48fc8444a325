//! Session layer for Gamedock: the in-memory store of live game
//! instances, the per-session exclusive-access guards, and the
//! lifecycle manager that drives creation, play, and expiry.
//!
//! The one rule everything here enforces: a game instance is only ever
//! touched while holding its session's guard. Concurrent actions
//! against the same session serialize; actions against different
//! sessions proceed in parallel.

mod config;
mod error;
mod manager;
mod store;

pub use config::SessionConfig;
pub use error::SessionError;
pub use manager::SessionManager;
pub use store::{SessionSlot, SessionStore, SlotState};
