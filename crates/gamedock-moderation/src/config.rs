//! Moderation configuration.

/// Tuning knobs for the moderation workflow.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Maximum game types a single author may hold at once, counting
    /// both pending proposals and approved games.
    ///
    /// Default: 10.
    pub max_authored_games: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            max_authored_games: 10,
        }
    }
}
