use std::time::Duration;

use rand::Rng;

pub(crate) const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub(crate) const DEFAULT_RETRY_BASE_MS: u64 = 1_000;
pub(crate) const DEFAULT_RETRY_JITTER_MS: u64 = 500;
const MAX_BACKOFF_SHIFT: u32 = 16;

/// Exponential backoff for transient completion failures.
///
/// `max_attempts` counts every request, the first one included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
            jitter_max: Duration::from_millis(DEFAULT_RETRY_JITTER_MS),
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the delay before retry `retry` (1-indexed): `base * 2^(retry-1)`.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.base_delay.saturating_mul(1_u32 << shift)
    }

    /// Full delay before retry `retry`: backoff plus uniform jitter in `[0, jitter_max)`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff_delay(retry).saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        let bound_ms = u64::try_from(self.jitter_max.as_millis()).unwrap_or(u64::MAX);
        if bound_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..bound_ms))
    }

    /// Whether another attempt may follow attempt number `attempt` (1-indexed).
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts.max(1)
    }
}
