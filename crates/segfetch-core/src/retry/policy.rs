use std::time::Duration;

/// Extra passes after the initial one: each range gets at most three attempts.
pub const DEFAULT_RETRY_PASSES: u32 = 2;

/// High-level classification of a segment failure.
///
/// Every kind is retried on the next pass; the kind only feeds logs and the
/// download summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Server error other than throttling.
    Http5xx(u16),
    /// Writing the body failed (disk, or the body overran its range).
    Storage,
    /// Anything else (4xx, unexpected curl errors).
    Other,
}

/// What to do once a pass has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDecision {
    /// Abandon whatever is still pending.
    Stop,
    /// Run another pass over the pending ranges after the given delay.
    RetryAfter(Duration),
}

/// Fixed-depth pass ladder with optional exponential backoff between passes.
///
/// With the defaults (two retry passes, zero base delay) passes run back to
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of passes after the initial one.
    pub retry_passes: u32,
    /// Delay before the first retry pass; doubles for each later pass.
    pub base_delay: Duration,
    /// Upper bound on the delay before any pass.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_passes: DEFAULT_RETRY_PASSES,
            base_delay: Duration::ZERO,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Maximum number of attempts any single range receives.
    pub fn max_attempts(&self) -> u32 {
        self.retry_passes.saturating_add(1)
    }

    /// Decide what follows pass `finished_pass` (0 = initial pass) when
    /// `pending` ranges failed in it.
    pub fn decide(&self, finished_pass: u32, pending: usize) -> PassDecision {
        if pending == 0 || finished_pass >= self.retry_passes {
            return PassDecision::Stop;
        }
        PassDecision::RetryAfter(self.delay_before(finished_pass + 1))
    }

    /// Delay before retry pass `pass` (1-based): `base * 2^(pass-1)`, capped.
    pub fn delay_before(&self, pass: u32) -> Duration {
        if pass == 0 || self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let exp = 1u32 << (pass - 1).min(16);
        self.base_delay.saturating_mul(exp).min(self.max_delay)
    }
}
