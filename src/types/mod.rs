//! Core types shared by the connector, telemetry and workers.

mod config;
mod endpoint;

pub use self::config::{
    AppConfig, BrokerSettings, ProducerSettings, RetrySettings, TelemetrySettings, ENV_PREFIX,
    INLET_EXCHANGE, SETTINGS_FILE,
};
pub use self::endpoint::BrokerEndpoint;
