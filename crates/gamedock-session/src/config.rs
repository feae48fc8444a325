//! Session configuration.

use std::time::Duration;

/// Configuration for session behavior.
///
/// These are the core's tuning knobs. The facade crate aggregates them
/// with the moderation knobs; defaults match the production service.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum concurrently active (non-expired) sessions per owner.
    ///
    /// Default: 10.
    pub max_active_sessions: u32,

    /// How long a session stays valid after creation.
    ///
    /// Default: 7 days.
    pub session_validity: Duration,

    /// Hard wall-clock deadline for a single plugin invocation.
    ///
    /// Default: 10 seconds. A session whose invocation exceeds this is
    /// poisoned and must be replaced by its owner.
    pub execution_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_active_sessions: 10,
            session_validity: Duration::from_secs(7 * 24 * 60 * 60),
            execution_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_active_sessions, 10);
        assert_eq!(config.session_validity, Duration::from_secs(604_800));
        assert_eq!(config.execution_timeout, Duration::from_secs(10));
    }
}
