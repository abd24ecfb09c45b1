//! Error types for connection bootstrap, broker I/O and configuration.

use thiserror::Error;

/// A connection policy or endpoint that fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    NoAttempts,

    #[error("max_delay ({max_delay_ms} ms) is shorter than initial_delay ({initial_delay_ms} ms)")]
    DelayCapBelowInitial {
        initial_delay_ms: u128,
        max_delay_ms: u128,
    },

    #[error("backoff_multiplier must be a finite number >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    #[error("broker endpoint is empty")]
    EmptyEndpoint,
}

/// Terminal outcome of a failed connection sequence.
///
/// Individual dial failures are retried and never surface on their own; the
/// caller sees exactly one of these per call to [`crate::connector::connect`].
#[derive(Debug, Error)]
pub enum ConnectError<E>
where
    E: std::error::Error + 'static,
{
    /// The policy or endpoint was rejected before any attempt was made.
    #[error("invalid connection policy: {0}")]
    Configuration(#[from] PolicyError),

    /// Every allowed attempt failed.
    #[error("broker unreachable after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// Shutdown was requested while connecting.
    #[error("connection cancelled after {attempts} attempts")]
    Cancelled {
        attempts: u32,
        last_error: Option<E>,
    },
}

impl<E> ConnectError<E>
where
    E: std::error::Error + 'static,
{
    /// Number of dial attempts made before the sequence ended.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Configuration(_) => 0,
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Errors raised while talking to the broker once connected.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error("inbound stream closed by broker")]
    StreamClosed,
}

/// Errors raised while loading [`crate::types::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}
