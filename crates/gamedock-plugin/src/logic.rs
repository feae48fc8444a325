//! The `GameInstance` seam — the extension point game authors implement.
//!
//! A game type's backing code ultimately boils down to two capabilities:
//! apply a player action to mutable state, and render the state into a
//! client-facing response. The runtime treats both as opaque: payloads
//! in, payloads out, no interpretation.
//!
//! Instances are stored as trait objects (`Box<dyn GameInstance>`), one
//! per live session, so the trait must stay object-safe: no generics,
//! no associated types. Payloads are `serde_json::Value` for the same
//! reason — the runtime can't know a plugin's message shapes at compile
//! time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A short player request against a session: an action name plus an
/// opaque parameter payload ("click unit x").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// What to do — interpreted solely by the game logic.
    pub name: String,

    /// Action parameters, opaque to the runtime.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Action {
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// A domain failure raised by game logic during normal execution
/// ("unit not found", "not your turn").
///
/// This is the plugin speaking, not the infrastructure: the invocation
/// completed, the game simply rejected the action. The session stays
/// usable afterwards — only timeouts and panics poison it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct GameError {
    pub message: String,
}

impl GameError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One live, stateful game: the opaque capability set
/// {apply-action, compute-response}.
///
/// # Trait bounds
///
/// - `Send` → the instance is moved into the execution engine's worker
///   for every invocation.
/// - `'static` → it owns all its state; nothing borrowed.
///
/// Instances are mutated only while their session's exclusive-access
/// guard is held — the session store enforces that, implementors don't
/// need their own locking.
pub trait GameInstance: Send + 'static {
    /// Applies a player action, mutating the game state.
    ///
    /// Returns an opaque result payload for the caller. A rule
    /// violation is an `Err(GameError)`; the state should be left
    /// consistent either way.
    fn apply_action(
        &mut self,
        action: &Action,
    ) -> Result<serde_json::Value, GameError>;

    /// Computes the client-facing view of the current state.
    fn render_response(&self) -> Result<serde_json::Value, GameError>;
}

/// Produces fresh game instances for one game type.
///
/// The plugin registry caches exactly one factory per game type id and
/// is the only component allowed to create instances from it. Factories
/// are shared (`Arc<dyn GameFactory>`) and must therefore be stateless
/// or internally synchronized.
pub trait GameFactory: Send + Sync + 'static {
    /// Creates a brand-new instance with initial state.
    fn new_instance(&self) -> Box<dyn GameInstance>;
}

/// A shared, type-erased factory handle as handed out by the registry.
pub type SharedFactory = Arc<dyn GameFactory>;

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_params_default_to_null() {
        // An action without params must still parse — `#[serde(default)]`
        // fills in JSON null.
        let action: Action =
            serde_json::from_str(r#"{"name": "pass"}"#).unwrap();
        assert_eq!(action.name, "pass");
        assert!(action.params.is_null());
    }

    #[test]
    fn test_action_round_trip() {
        let action = Action::new("click", serde_json::json!({"unit": "x"}));
        let bytes = serde_json::to_vec(&action).unwrap();
        let decoded: Action = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(action, decoded);
    }

    #[test]
    fn test_game_error_displays_message() {
        let err = GameError::new("unit not found");
        assert_eq!(err.to_string(), "unit not found");
    }
}
