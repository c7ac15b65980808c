use std::time::Duration;

/// Parameters for one bounded exponential-backoff sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each failure after that.
    pub base_delay: Duration,
    /// Ceiling the doubled delay never exceeds.
    pub max_delay: Duration,
    /// Optional jitter fraction in `0.0..=1.0`; each delay is perturbed by
    /// up to ±`jitter * delay`.
    pub jitter: Option<f64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            jitter: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_attempts` and default delays.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Override the base delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Override the delay ceiling.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Enable jitter with the given fraction.
    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter = Some(fraction.clamp(0.0, 1.0));
        self
    }

    /// Unjittered delay after the given 1-based failed attempt:
    /// `min(max_delay, base_delay * 2^(attempt-1))`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay)
    }

    /// Delay after `attempt`, perturbed by jitter when configured.
    pub(crate) fn sleep_delay(&self, attempt: u32, seed: u64) -> Duration {
        let delay = self.delay_for(attempt);
        let Some(fraction) = self.jitter else {
            return delay;
        };
        if fraction <= 0.0 {
            return delay;
        }

        let unit = unit_interval(seed ^ u64::from(attempt)) * 2.0 - 1.0;
        let perturbed = delay.as_secs_f64() * (1.0 + fraction * unit);
        Duration::from_secs_f64(perturbed.max(0.0)).min(self.max_delay)
    }
}

/// Cheap xorshift mapped into `[0, 1)`. Retry delays need spread, not
/// cryptographic quality, so no RNG dependency is pulled in.
fn unit_interval(mut state: u64) -> f64 {
    state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    (state >> 11) as f64 / (1u64 << 53) as f64
}
