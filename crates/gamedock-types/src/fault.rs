//! The structured failure outcome visible to callers.
//!
//! Every failure crossing the service boundary is translated into a
//! [`Fault`]: a stable machine-readable reason code plus a
//! human-readable message. Internal error enums stay rich and typed;
//! the fault is the flattened, wire-friendly rendering of them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable reason codes for caller-visible failures.
///
/// `#[serde(rename_all = "snake_case")]` gives the wire form clients
/// match on: `"not_found"`, `"execution_timeout"`, and so on. These
/// strings are a compatibility contract — add codes freely, never
/// rename one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    /// Unknown session, game type, or proposal id.
    NotFound,
    /// Id collision on create.
    Duplicate,
    /// Session or authoring limit reached.
    QuotaExceeded,
    /// Malformed source location or missing required fields.
    InvalidInput,
    /// Wrong moderation token or wrong session owner.
    Unauthorized,
    /// Plugin code exceeded its execution deadline; the session is no
    /// longer usable.
    ExecutionTimeout,
    /// Plugin code failed during normal execution.
    ExecutionError,
    /// Fetching or loading the plugin's backing code failed.
    PluginLoadFailed,
    /// Anything else — storage backends, broken invariants.
    Internal,
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the serde name so logs and wire agree.
        let s = match self {
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
            Self::QuotaExceeded => "quota_exceeded",
            Self::InvalidInput => "invalid_input",
            Self::Unauthorized => "unauthorized",
            Self::ExecutionTimeout => "execution_timeout",
            Self::ExecutionError => "execution_error",
            Self::PluginLoadFailed => "plugin_load_failed",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A caller-visible failure: stable code + human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub code: FaultCode,
    pub message: String,
}

impl Fault {
    pub fn new(code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// =========================================================================
// Tests
// =========================================================================
