//! Connection attempt policy and the backoff schedule it produces.
//!
//! Delays grow exponentially from `initial_delay` by `backoff_multiplier` and
//! are capped at `max_delay`. No jitter is applied, so the schedule is fully
//! deterministic for a given policy.

use std::time::Duration;

use crate::error::PolicyError;

/// How many times to try connecting and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionAttemptPolicy {
    /// Wait after the first failed attempt.
    pub initial_delay: Duration,
    /// Factor applied to the wait after every failed attempt.
    pub backoff_multiplier: f64,
    /// Upper bound for any single wait.
    pub max_delay: Duration,
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for ConnectionAttemptPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            max_attempts: 11,
        }
    }
}

impl ConnectionAttemptPolicy {
    /// Create a validated policy.
    pub fn new(
        initial_delay: Duration,
        backoff_multiplier: f64,
        max_delay: Duration,
        max_attempts: u32,
    ) -> Result<Self, PolicyError> {
        let policy = Self {
            initial_delay,
            backoff_multiplier,
            max_delay,
            max_attempts,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the policy invariants.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_attempts == 0 {
            return Err(PolicyError::NoAttempts);
        }
        if self.max_delay < self.initial_delay {
            return Err(PolicyError::DelayCapBelowInitial {
                initial_delay_ms: self.initial_delay.as_millis(),
                max_delay_ms: self.max_delay.as_millis(),
            });
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(PolicyError::InvalidMultiplier(self.backoff_multiplier));
        }
        Ok(())
    }

    /// Wait durations between attempts, in order.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            next: self.initial_delay.min(self.max_delay),
            multiplier: self.backoff_multiplier,
            max_delay: self.max_delay,
        }
    }

    /// Wait durations actually used by a sequence that exhausts the policy.
    ///
    /// There is one fewer wait than attempts: nothing follows the last one.
    pub fn waits(&self) -> impl Iterator<Item = Duration> {
        self.schedule()
            .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Infinite iterator of backoff delays: `d0 = initial`, `dn = min(dn-1 * m, max)`.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    next: Duration,
    multiplier: f64,
    max_delay: Duration,
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = grow(current, self.multiplier, self.max_delay);
        Some(current)
    }
}

fn grow(current: Duration, multiplier: f64, max_delay: Duration) -> Duration {
    if current >= max_delay {
        return max_delay;
    }
    let scaled = current.as_secs_f64() * multiplier;
    if !scaled.is_finite() || scaled >= max_delay.as_secs_f64() {
        max_delay
    } else {
        Duration::from_secs_f64(scaled).max(current)
    }
}
