//! RabbitMQ client for the producer and consumer workers.
//!
//! Provides the `lapin` dialer used by the resilient connector, plus the
//! channel-level operations both roles need once connected.

use async_trait::async_trait;
use lapin::{
    options::*,
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::inbound::Inbound;
use super::MessageSink;
use crate::connector::BrokerDialer;
use crate::error::BrokerError;
use crate::types::BrokerEndpoint;

/// Opens AMQP connections with `lapin`.
#[derive(Clone, Default)]
pub struct AmqpDialer {
    properties: ConnectionProperties,
}

impl AmqpDialer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BrokerDialer for AmqpDialer {
    type Connection = Connection;
    type Error = lapin::Error;

    async fn dial(&self, endpoint: &BrokerEndpoint) -> Result<Connection, lapin::Error> {
        debug!(uri = %endpoint, "Opening AMQP connection");
        Connection::connect(endpoint.uri(), self.properties.clone()).await
    }
}

/// A connection plus the single channel a worker uses.
pub struct BrokerSession {
    connection: Connection,
    channel: Channel,
    exchange: String,
}

impl BrokerSession {
    /// Open a channel on `connection` and declare the shared fanout exchange.
    #[instrument(skip(connection))]
    pub async fn open(connection: Connection, exchange: &str) -> Result<Self, BrokerError> {
        let channel = connection.create_channel().await?;

        channel
            .exchange_declare(
                exchange,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions {
                    durable: false,
                    auto_delete: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        info!(exchange = %exchange, "Exchange declared");

        Ok(Self {
            connection,
            channel,
            exchange: exchange.to_string(),
        })
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Publisher bound to this session's exchange.
    pub fn publisher(&self) -> AmqpPublisher {
        AmqpPublisher {
            channel: self.channel.clone(),
            exchange: self.exchange.clone(),
        }
    }

    /// Declare a private queue bound to the exchange and start consuming it.
    ///
    /// The queue is server-named, exclusive and auto-deleted, so every
    /// consumer instance sees its own copy of each fanout message.
    #[instrument(skip(self, cancel), fields(exchange = %self.exchange))]
    pub async fn subscribe(
        &self,
        consumer_tag: &str,
        cancel: CancellationToken,
    ) -> Result<Inbound<Consumer>, BrokerError> {
        let queue = self
            .channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    durable: false,
                    exclusive: true,
                    auto_delete: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        let queue_name = queue.name().as_str().to_string();

        let consumer = self
            .channel
            .basic_consume(
                &queue_name,
                consumer_tag,
                BasicConsumeOptions {
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        self.channel
            .queue_bind(
                &queue_name,
                &self.exchange,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        info!(queue = %queue_name, "Started consuming");

        Ok(Inbound::new(consumer, cancel))
    }

    /// Close the channel and the connection.
    pub async fn close(self) -> Result<(), BrokerError> {
        self.channel.close(200, "worker stopped").await?;
        self.connection.close(200, "worker stopped").await?;
        info!("Broker session closed");
        Ok(())
    }
}

/// Publishes to a fanout exchange with an empty routing key.
#[derive(Clone)]
pub struct AmqpPublisher {
    channel: Channel,
    exchange: String,
}

#[async_trait]
impl MessageSink for AmqpPublisher {
    async fn publish(&self, payload: &[u8]) -> Result<(), BrokerError> {
        self.channel
            .basic_publish(
                &self.exchange,
                "",
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default(),
            )
            .await?;
        Ok(())
    }
}

/// Inbound deliveries from a [`BrokerSession::subscribe`] call.
pub type AmqpInbound = Inbound<Consumer>;
