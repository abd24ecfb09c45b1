//! Publish loop.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::BrokerError;
use crate::messaging::{MessageSink, Payload};
use crate::telemetry::MessageCounter;

/// Publishes the same payload until cancelled, counting every publish.
pub struct Producer<S> {
    sink: S,
    counter: MessageCounter,
    payload: Payload,
    interval: Option<Duration>,
}

impl<S: MessageSink> Producer<S> {
    pub fn new(sink: S, counter: MessageCounter, payload: Payload) -> Self {
        Self {
            sink,
            counter,
            payload,
            interval: None,
        }
    }

    /// Pause between publishes.
    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `cancel` fires. Returns the number of messages published.
    ///
    /// A publish error ends the loop; reconnecting is up to the caller.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<u64, BrokerError> {
        let mut sent = 0u64;
        info!(payload_len = self.payload.len(), "Starting publish loop");

        while !cancel.is_cancelled() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.sink.publish(self.payload.as_bytes()) => result?,
            }
            self.counter.increment();
            sent += 1;

            if let Some(interval) = self.interval {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }

        info!(sent, "Publish loop stopped");
        Ok(sent)
    }
}
