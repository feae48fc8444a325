//! Notifying human moderators about new proposals.
//!
//! Delivery is an external collaborator's job (a chat bot, email, a
//! review dashboard). The queue only needs one capability: "tell a
//! moderator about this pending proposal". Delivery is best-effort —
//! a failed notification is logged and the proposal stays pending,
//! reachable through [`ModerationQueue::pending`].
//!
//! [`ModerationQueue::pending`]: crate::ModerationQueue::pending

use std::future::Future;

use crate::PendingGameType;

/// A notification that could not be delivered.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// Delivers proposal notifications to whoever moderates game types.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` — the notifier is shared by every proposal
/// task the queue serves.
pub trait ModerationNotifier: Send + Sync + 'static {
    /// Delivers a notification about `pending`.
    ///
    /// # Errors
    /// [`NotifyError`] for any delivery failure. The queue logs it and
    /// moves on.
    fn notify(
        &self,
        pending: &PendingGameType,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

impl<N: ModerationNotifier> ModerationNotifier for std::sync::Arc<N> {
    fn notify(
        &self,
        pending: &PendingGameType,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        N::notify(self, pending)
    }
}

/// The canonical human-facing review message for a pending proposal.
///
/// Carries everything a moderator needs to decide, plus the one-time
/// decision links. The token in the links is what authenticates the
/// decision — the message must only ever reach moderators.
pub fn review_message(pending: &PendingGameType) -> String {
    let d = &pending.descriptor;
    format!(
        "New game type proposal: {name:?} by {author}\n\
         Source: {source}\n\
         {description}\n\
         Approve: /moderation/approve?game_type={id}&token={token}\n\
         Decline: /moderation/decline?game_type={id}&token={token}",
        name = d.name,
        author = d.author,
        source = d.source,
        description = d.description,
        id = d.id,
        token = pending.token,
    )
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use gamedock_types::{GameTypeDescriptor, GameTypeId, UserId};

    use super::*;

    #[test]
    fn test_review_message_carries_id_and_token() {
        let pending = PendingGameType {
            descriptor: GameTypeDescriptor {
                id: GameTypeId("g1".into()),
                name: "Chess".into(),
                author: UserId::new("alice"),
                source: "https://example.com/chess.git".into(),
                description: "the classic".into(),
                created_at_ms: 0,
                play_count: 0,
            },
            token: "deadbeef".into(),
        };

        let message = review_message(&pending);
        assert!(message.contains("game_type=g1&token=deadbeef"));
        assert!(message.contains("/moderation/approve"));
        assert!(message.contains("/moderation/decline"));
        assert!(message.contains("https://example.com/chess.git"));
    }
}
