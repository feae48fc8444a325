//! Wall-clock helper for persisted timestamps.
//!
//! In-memory guards and deadlines use `std::time::Instant` (monotonic),
//! but anything that crosses the durable-store boundary needs a wall
//! clock that survives a process restart. We store unix milliseconds as
//! plain `u64` — trivially serializable and comparable.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, as a `u64`.
///
/// A system clock set before 1970 would make this panic-free code
/// return 0 instead; we treat that as "the distant past".
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
        // Sanity: we are past 2020-01-01.
        assert!(a > 1_577_836_800_000);
    }
}
