//! The caller-identity boundary.
//!
//! Who a caller *is* comes from outside: a token verifier, an OAuth
//! gateway, a cookie session. Gamedock only needs the outcome — an
//! opaque principal id plus whether the identity is anonymous. Anonymous
//! identities may create and play sessions; authoring game types
//! requires a registered identity.

use std::future::Future;

use gamedock_types::UserId;

/// An identity could not be verified (bad token, provider down).
#[derive(Debug, thiserror::Error)]
#[error("identity verification failed: {0}")]
pub struct IdentityError(pub String);

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,

    /// Anonymous identities are real principals (they own sessions)
    /// but are barred from authoring.
    pub anonymous: bool,
}

impl Identity {
    /// A registered (non-anonymous) identity.
    pub fn registered(user_id: UserId) -> Self {
        Self {
            user_id,
            anonymous: false,
        }
    }

    /// An anonymous guest identity.
    pub fn anonymous(user_id: UserId) -> Self {
        Self {
            user_id,
            anonymous: true,
        }
    }
}

/// Verifies caller tokens and resolves them to identities.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` — shared by every request the facade serves.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Resolves `auth_token` to a verified identity.
    ///
    /// # Errors
    /// [`IdentityError`] if the token is invalid or verification is
    /// unavailable.
    fn identify(
        &self,
        auth_token: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;
}
