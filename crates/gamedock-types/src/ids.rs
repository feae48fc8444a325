//! Identifier newtypes shared across the Gamedock crates.
//!
//! Every entity in the system is keyed by an opaque string id. We wrap
//! each kind of id in its own newtype so the compiler keeps them apart:
//! a `SessionId` can never be passed where a `GameTypeId` is expected,
//! even though both are strings underneath.
//!
//! Generated ids are 32-character lowercase hex strings — 128 bits of
//! randomness, enough that guessing a valid id is computationally
//! infeasible. Session ids in particular are a capability: knowing one
//! is (together with the owner check) what lets you play the session.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Generates a random 32-character lowercase hex string (128 bits).
pub(crate) fn random_hex() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// An opaque principal id issued by the external identity provider.
///
/// Gamedock never parses or validates these — they are whatever the
/// identity provider hands us (a Firebase uid, a JWT subject, …).
///
/// `#[serde(transparent)]` makes a `UserId("alice")` serialize as just
/// `"alice"`, not `{"0":"alice"}` — the id travels as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Convenience constructor from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unique id of a pluggable game type.
///
/// Assigned once when a game type is proposed and immutable thereafter.
/// The moderation queue, the plugin registry, and the durable store all
/// key on this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTypeId(pub String);

impl GameTypeId {
    /// Generates a fresh, globally unique game type id.
    pub fn generate() -> Self {
        Self(random_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unique id of a live game session.
///
/// Fresh and unpredictable: generated from 128 random bits at session
/// creation, never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh, unpredictable session id.
    pub fn generate() -> Self {
        Self(random_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =========================================================================
// Tests
// =========================================================================
