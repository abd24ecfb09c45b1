//! Broker messaging.
//!
//! ## Features
//! - `lapin` dialer plugged into the resilient connector
//! - Fanout exchange and private queue topology
//! - Cancellable inbound sequence for consumers
//! - Seeded payloads for the producer

pub mod inbound;
pub mod payload;
pub mod rabbit_client;

use async_trait::async_trait;

use crate::error::BrokerError;

pub use inbound::Inbound;
pub use payload::Payload;
pub use rabbit_client::{AmqpDialer, AmqpInbound, AmqpPublisher, BrokerSession};

/// Destination for produced messages.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn publish(&self, payload: &[u8]) -> Result<(), BrokerError>;
}
