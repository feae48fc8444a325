//! Bounded-deadline execution of untrusted game logic.
//!
//! Plugin code is untrusted: it may loop forever, block, or panic. The
//! one guarantee this crate provides is that the *caller* regains
//! control within the deadline, whatever the callee does, and that a
//! misbehaving callee can never crash or hang the host process.
//!
//! # The termination model
//!
//! Cooperative cancellation is useless here — untrusted code cannot be
//! trusted to check a flag. Instead the engine treats the callable as a
//! disposable unit of execution:
//!
//! 1. Everything the callable needs (including the live game instance)
//!    is **moved into** the closure.
//! 2. The closure runs on a dedicated blocking thread
//!    (`tokio::task::spawn_blocking`), raced against
//!    `tokio::time::timeout`.
//! 3. On a normal return, ownership of the moved state comes back to
//!    the caller along with the result.
//! 4. On timeout, the unit is abandoned. Rust cannot kill a thread, but
//!    it doesn't need to: the abandoned closure still *owns* the state
//!    it was given, so nothing it does afterwards can reach shared
//!    state. From the caller's perspective the unit is terminated and
//!    its state is lost — the session layer marks the corresponding
//!    slot poisoned and the owner must start a new session.
//!
//! A panicking callable is caught at the task join and surfaced as
//! [`ExecError::Panicked`] rather than unwinding into the server.

use std::time::Duration;

/// Why a deadline-bounded invocation produced no result.
///
/// A callable's *own* failure (a game rule rejecting an action) is not
/// an `ExecError` — that comes back as the callable's normal return
/// value. These variants mean the execution unit itself was lost.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The callable did not return within the deadline. The execution
    /// unit was abandoned and everything moved into it is gone.
    #[error("execution exceeded deadline of {deadline:?}")]
    Timeout {
        /// The deadline that was exceeded.
        deadline: Duration,
    },

    /// The callable panicked. Caught at the join boundary so the host
    /// never unwinds.
    #[error("game logic panicked during execution")]
    Panicked,
}

/// Runs `task` on a blocking worker with a hard wall-clock deadline.
///
/// On success the callable's return value is handed back verbatim — the
/// engine does not interpret it. Callers that need state back (the
/// session layer moves the game instance in) simply return it as part
/// of `T`.
///
/// # Errors
/// - [`ExecError::Timeout`] — control returns within `deadline` plus
///   scheduler noise; the moved-in state is unrecoverable.
/// - [`ExecError::Panicked`] — the callable panicked.
pub async fn run_with_deadline<T, F>(
    deadline: Duration,
    task: F,
) -> Result<T, ExecError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(task);

    match tokio::time::timeout(deadline, handle).await {
        // Finished in time.
        Ok(Ok(value)) => Ok(value),

        // The blocking task itself failed. `spawn_blocking` tasks can't
        // be cancelled, so a join error here means a panic.
        Ok(Err(join_err)) => {
            tracing::warn!(error = %join_err, "game logic panicked");
            Err(ExecError::Panicked)
        }

        // Deadline expired. The worker thread may still be running; it
        // owns its state and is never heard from again.
        Err(_elapsed) => {
            tracing::warn!(?deadline, "game logic exceeded deadline, abandoning worker");
            Err(ExecError::Timeout { deadline })
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
