//! Moderation layer for Gamedock: the proposal queue that gates which
//! game types become playable.
//!
//! Authors propose; proposals wait in the queue with a secret decision
//! token; moderators (notified through the [`ModerationNotifier`]
//! boundary) approve or decline. Quota is charged atomically at
//! proposal time and released only on decline — approval keeps the
//! slot occupied for good.

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod notify;
mod queue;

pub use config::ModerationConfig;
pub use error::ModerationError;
pub use notify::{ModerationNotifier, NotifyError, review_message};
pub use queue::{ModerationQueue, PendingGameType, ProposedGame};
