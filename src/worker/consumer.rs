//! Receive loop.

use std::fmt::Display;

use futures::Stream;
use tracing::{error, info, warn};

use crate::error::BrokerError;
use crate::messaging::Inbound;
use crate::telemetry::MessageCounter;

/// Drains an inbound sequence, counting every delivery.
pub struct Consumer {
    counter: MessageCounter,
}

impl Consumer {
    pub fn new(counter: MessageCounter) -> Self {
        Self { counter }
    }

    /// Run until the inbound sequence is cancelled or closed.
    ///
    /// Returns the number of deliveries received. Failed deliveries are
    /// logged and skipped. A sequence closed by the broker rather than by
    /// cancellation is reported as [`BrokerError::StreamClosed`].
    pub async fn run<S, T, E>(&self, inbound: &mut Inbound<S>) -> Result<u64, BrokerError>
    where
        S: Stream<Item = Result<T, E>> + Unpin,
        E: Display,
    {
        let mut received = 0u64;
        info!("Starting receive loop");

        while let Some(delivery) = inbound.next().await {
            match delivery {
                Ok(_) => {
                    self.counter.increment();
                    received += 1;
                }
                Err(e) => {
                    error!(error = %e, "Consumer error");
                }
            }
        }

        if !inbound.is_cancelled() {
            warn!(received, "Inbound stream closed by broker");
            return Err(BrokerError::StreamClosed);
        }

        info!(received, "Receive loop stopped");
        Ok(received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_counts_deliveries_and_skips_errors() {
        let cancel = CancellationToken::new();
        let items = vec![Ok(vec![1u8]), Err("frame error"), Ok(vec![2]), Ok(vec![3])];
        // keep the stream open after the scripted items so only cancellation ends it
        let script = stream::iter(items).chain(stream::pending());
        let mut inbound = Inbound::new(Box::pin(script), cancel.clone());

        let counter = MessageCounter::new();
        let consumer = Consumer::new(counter.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let received = consumer.run(&mut inbound).await.unwrap();
        assert_eq!(received, 3);
        assert_eq!(counter.get(), 3);
    }

    #[tokio::test]
    async fn test_broker_close_is_an_error() {
        let items = stream::iter(vec![Ok::<_, String>(()), Ok(())]);
        let mut inbound = Inbound::new(items, CancellationToken::new());

        let counter = MessageCounter::new();
        let err = Consumer::new(counter.clone()).run(&mut inbound).await.unwrap_err();

        assert!(matches!(err, BrokerError::StreamClosed));
        assert_eq!(counter.get(), 2);
    }
}
