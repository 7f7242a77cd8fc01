//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Jitter drawn uniformly from `[0, JITTER_RANGE_MS)` milliseconds.
pub const JITTER_RANGE_MS: u64 = 1000;

/// Calculate the delay before the next attempt.
///
/// `attempt` is zero-based: 0 is the delay before the second attempt. The
/// exponential term saturates instead of overflowing, and the jittered delay
/// is capped at `max_ms` so worst-case latency stays bounded.
pub fn compute_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    compute_delay_with(attempt, base_ms, max_ms, || {
        rand::thread_rng().gen_range(0..JITTER_RANGE_MS)
    })
}

/// Same formula with the jitter source supplied by the caller, so tests can
/// pin the random component.
pub fn compute_delay_with<J>(attempt: u32, base_ms: u64, max_ms: u64, mut jitter_ms: J) -> Duration
where
    J: FnMut() -> u64,
{
    let exponential = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    let delay_ms = exponential.saturating_add(jitter_ms()).min(max_ms);
    Duration::from_millis(delay_ms)
}
