//! RabbitMQ throughput workers.
//!
//! A producer and a consumer that meet on a fanout exchange. Both share the
//! same bootstrap: a resilient connector that retries the broker connection
//! with capped exponential backoff, and a rate gauge that turns each role's
//! message counter into messages per second.

pub mod api;
pub mod app;
pub mod connector;
pub mod error;
pub mod messaging;
pub mod telemetry;
pub mod types;
pub mod worker;

pub use connector::{connect, BrokerDialer, ConnectionAttemptPolicy, ConnectionOutcome};
pub use error::{BrokerError, ConfigError, ConnectError, PolicyError};
pub use telemetry::{Meter, MessageCounter, RateGauge};
pub use types::{AppConfig, BrokerEndpoint};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::connector::*;
    pub use crate::error::*;
    pub use crate::telemetry::{Meter, MessageCounter, RateGauge, RateSample};
    pub use crate::types::*;
}
