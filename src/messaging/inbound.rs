//! Cancellable pull-based consumption.

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Lazy, unbounded sequence of inbound items.
///
/// [`Inbound::next`] suspends until the broker delivers something. Once the
/// cancellation token fires, or the underlying stream ends, every further
/// call returns `None`.
pub struct Inbound<S> {
    stream: S,
    cancel: CancellationToken,
    finished: bool,
}

impl<S, T, E> Inbound<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    pub fn new(stream: S, cancel: CancellationToken) -> Self {
        Self {
            stream,
            cancel,
            finished: false,
        }
    }

    /// Next delivery, or `None` once cancelled or closed.
    pub async fn next(&mut self) -> Option<Result<T, E>> {
        if self.finished {
            return None;
        }

        let item = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            item = self.stream.next() => item,
        };

        if item.is_none() {
            self.finished = true;
        }
        item
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the sequence ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
