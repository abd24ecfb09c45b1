//! Monotonic message counter shared between a worker and its gauge.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cheaply cloneable counter; every clone sees the same value.
#[derive(Debug, Clone, Default)]
pub struct MessageCounter {
    value: Arc<AtomicU64>,
}

impl MessageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.add(1);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Zero-argument accessor suitable for [`super::RateGauge`].
    pub fn accessor(&self) -> impl Fn() -> u64 + Send + Sync + 'static {
        let value = Arc::clone(&self.value);
        move || value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let counter = MessageCounter::new();
        let writer = counter.clone();
        let read = counter.accessor();

        writer.increment();
        writer.add(41);

        assert_eq!(counter.get(), 42);
        assert_eq!(read(), 42);
    }

    #[tokio::test]
    async fn test_concurrent_increments() {
        let counter = MessageCounter::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let c = counter.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..1000 {
                    c.increment();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.get(), 8000);
    }
}
