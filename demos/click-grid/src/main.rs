//! Click Grid: a minimal Gamedock game plus a walkthrough of the whole
//! platform lifecycle — propose, moderate, create a session, play,
//! render, expire.
//!
//! Run with `RUST_LOG=info cargo run -p click-grid`.

use std::sync::Arc;
use std::time::Duration;

use gamedock::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

const GRID_SIZE: usize = 3;

#[derive(Clone, Serialize, Deserialize)]
struct Grid {
    /// `clicked[row][col]` — true once the unit has been clicked.
    clicked: [[bool; GRID_SIZE]; GRID_SIZE],
    clicks: u64,
}

impl Grid {
    fn new() -> Self {
        Self {
            clicked: [[false; GRID_SIZE]; GRID_SIZE],
            clicks: 0,
        }
    }

    fn all_clicked(&self) -> bool {
        self.clicked.iter().flatten().all(|&c| c)
    }
}

/// Parameters of the `click` action.
#[derive(Deserialize)]
struct Click {
    row: usize,
    col: usize,
}

// ---------------------------------------------------------------------------
// Game logic
// ---------------------------------------------------------------------------

struct ClickGrid {
    grid: Grid,
}

impl GameInstance for ClickGrid {
    fn apply_action(
        &mut self,
        action: &Action,
    ) -> Result<serde_json::Value, GameError> {
        match action.name.as_str() {
            "click" => {
                let click: Click =
                    serde_json::from_value(action.params.clone()).map_err(
                        |e| GameError::new(format!("bad click params: {e}")),
                    )?;
                if click.row >= GRID_SIZE || click.col >= GRID_SIZE {
                    return Err(GameError::new(format!(
                        "unit not found: ({}, {})",
                        click.row, click.col
                    )));
                }
                if self.grid.clicked[click.row][click.col] {
                    return Err(GameError::new("unit already clicked"));
                }
                self.grid.clicked[click.row][click.col] = true;
                self.grid.clicks += 1;
                Ok(serde_json::json!({
                    "clicks": self.grid.clicks,
                    "done": self.grid.all_clicked(),
                }))
            }
            other => {
                Err(GameError::new(format!("unknown action {other:?}")))
            }
        }
    }

    fn render_response(&self) -> Result<serde_json::Value, GameError> {
        serde_json::to_value(&self.grid)
            .map_err(|e| GameError::new(e.to_string()))
    }
}

struct ClickGridFactory;

impl GameFactory for ClickGridFactory {
    fn new_instance(&self) -> Box<dyn GameInstance> {
        Box::new(ClickGrid { grid: Grid::new() })
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), GamedockError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let loader = ManifestLoader::new()
        .register("click-grid", Arc::new(ClickGridFactory));
    let platform = GamedockBuilder::new()
        .sweep_interval(Duration::from_secs(60))
        .build(
            StaticSource::new(br#"{"entry": "click-grid"}"#.to_vec()),
            Arc::new(MemoryStore::new()),
            Arc::new(loader),
            LogNotifier,
            OpenIdentity,
        );
    let sweeper = platform.start_sweeper();

    // Alice authors the game; the review message (with the decision
    // links) lands in the log via LogNotifier.
    let pending = platform
        .propose_game(
            "alice",
            ProposedGame {
                name: "Click Grid".into(),
                source: "https://example.com/click-grid.git".into(),
                description: "click every unit in the grid".into(),
            },
        )
        .await?;
    let game = pending.descriptor.id.clone();
    tracing::info!(%game, "proposed");

    // A moderator approves it with the decision token.
    platform.approve_game(&game, &pending.token).await?;
    tracing::info!(%game, "approved and listed");

    // Bob starts a session and clicks around.
    let session = platform.create_session("bob", &game).await?;
    tracing::info!(session = %session.id, "session created");

    let outcome = platform
        .play(
            "bob",
            &session.id,
            Action::new("click", serde_json::json!({"row": 0, "col": 0})),
        )
        .await?;
    tracing::info!(%outcome, "clicked (0, 0)");

    // An out-of-range click is the game's own error; the session
    // survives it.
    let fault = platform
        .play(
            "bob",
            &session.id,
            Action::new("click", serde_json::json!({"row": 9, "col": 9})),
        )
        .await
        .expect_err("unit (9, 9) does not exist")
        .fault();
    tracing::info!(code = %fault.code, message = %fault.message, "rejected");

    let view = platform.render("bob", &session.id).await?;
    tracing::info!(%view, "current grid");

    // Clean up: delete the session and stop the sweeper.
    platform.delete_session("bob", &session.id).await?;
    sweeper.abort();
    tracing::info!("done");
    Ok(())
}
