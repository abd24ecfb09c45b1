//! Instantaneous rate derived from a monotonic counter.
//!
//! Each call to [`RateGauge::sample`] reads the counter and the clock, divides
//! the counter delta by the elapsed seconds since the previous call and then
//! replaces the retained `(value, timestamp)` pair. The whole sequence runs
//! under one mutex so overlapping callers never pair a value with another
//! caller's timestamp.
//!
//! Degenerate samples never error:
//! - the first sample of an unseeded gauge only records a baseline and
//!   reports `0.0`;
//! - a sample with zero elapsed time reports `0.0` and keeps the previous
//!   pair, so the delta lands in the next interval.
//!
//! A counter that goes backwards yields a negative rate. Resets are not
//! detected.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};

/// Rate reported for baseline and zero-interval samples.
pub const BASELINE_RATE: f64 = 0.0;

type Accessor = Box<dyn Fn() -> u64 + Send + Sync>;

/// Counter reading captured at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// Counter value read during this sample.
    pub value: u64,
    /// Clock reading taken together with `value`.
    pub at: Instant,
    /// Time since the retained sample, `None` for a baseline.
    pub elapsed: Option<Duration>,
    /// Units per second over `elapsed`.
    pub rate: f64,
}

#[derive(Debug, Clone, Copy)]
struct Previous {
    value: u64,
    at: Instant,
}

/// Rate-of-change gauge over a counter accessor.
pub struct RateGauge {
    accessor: Accessor,
    clock: Box<dyn Clock>,
    previous: Mutex<Option<Previous>>,
}

impl RateGauge {
    /// Gauge whose first sample establishes the baseline and reports zero.
    pub fn new<F>(accessor: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        Self::with_clock(accessor, SystemClock)
    }

    /// Gauge that captures its baseline now, at registration time.
    pub fn seeded<F>(accessor: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        Self::seeded_with_clock(accessor, SystemClock)
    }

    pub fn with_clock<F, C>(accessor: F, clock: C) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
        C: Clock + 'static,
    {
        Self {
            accessor: Box::new(accessor),
            clock: Box::new(clock),
            previous: Mutex::new(None),
        }
    }

    pub fn seeded_with_clock<F, C>(accessor: F, clock: C) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
        C: Clock + 'static,
    {
        let gauge = Self::with_clock(accessor, clock);
        gauge.sample();
        gauge
    }

    /// Current rate in units per second.
    pub fn sample(&self) -> f64 {
        self.sample_detailed().rate
    }

    /// Take a sample and return the full reading.
    pub fn sample_detailed(&self) -> RateSample {
        let mut previous = self.previous.lock().unwrap_or_else(|e| e.into_inner());

        let value = (self.accessor)();
        let at = self.clock.now();

        let Some(prev) = *previous else {
            *previous = Some(Previous { value, at });
            return RateSample {
                value,
                at,
                elapsed: None,
                rate: BASELINE_RATE,
            };
        };

        let elapsed = at.saturating_duration_since(prev.at);
        if elapsed.is_zero() {
            return RateSample {
                value,
                at,
                elapsed: Some(elapsed),
                rate: BASELINE_RATE,
            };
        }

        let rate = (value as f64 - prev.value as f64) / elapsed.as_secs_f64();
        *previous = Some(Previous { value, at });

        RateSample {
            value,
            at,
            elapsed: Some(elapsed),
            rate,
        }
    }
}

impl std::fmt::Debug for RateGauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGauge")
            .field("previous", &*self.previous.lock().unwrap_or_else(|e| e.into_inner()))
            .finish_non_exhaustive()
    }
}
