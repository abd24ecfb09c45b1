//! Throughput telemetry.
//!
//! Workers count messages on a [`MessageCounter`]; a [`RateGauge`] turns that
//! counter into messages per second whenever the [`Meter`] observer ticks.

mod clock;
mod counter;
mod meter;
mod rate_gauge;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::MessageCounter;
pub use meter::{CounterSnapshot, GaugeReading, GaugeSnapshot, InstrumentInfo, Meter, MeterSnapshot};
pub use rate_gauge::{RateGauge, RateSample, BASELINE_RATE};

/// Default meter name.
pub const METER_NAME: &str = "cloud.pokojny.examples";

pub const MESSAGES_SENT_COUNT: &str = "messages.sent.count";
pub const MESSAGES_SENDING_RATE: &str = "messages.sending.rate";
pub const MESSAGES_RECEIVED_COUNT: &str = "messages.received.count";
pub const MESSAGES_RECEIVING_RATE: &str = "messages.receiving.rate";

pub const UNIT_MESSAGES: &str = "messages";
/// Messages per second.
pub const UNIT_RATE: &str = "mps";
