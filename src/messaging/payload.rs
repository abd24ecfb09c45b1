//! Deterministic message bodies for the producer.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A seeded random buffer and the slice of it sent with every message.
#[derive(Debug, Clone)]
pub struct Payload {
    buffer: Vec<u8>,
    len: usize,
}

impl Payload {
    /// Fill `buffer_size` bytes from `seed` and publish the first `len` of them.
    ///
    /// The buffer is grown to `len` when it would be too small.
    pub fn seeded(len: usize, buffer_size: usize, seed: u64) -> Self {
        let mut buffer = vec![0u8; buffer_size.max(len)];
        StdRng::seed_from_u64(seed).fill_bytes(&mut buffer);
        Self { buffer, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_bytes() {
        let a = Payload::seeded(1_000, 100_000, 123);
        let b = Payload::seeded(1_000, 100_000, 123);
        let c = Payload::seeded(1_000, 100_000, 124);

        assert_eq!(a.len(), 1_000);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn test_buffer_grows_to_fit_payload() {
        let payload = Payload::seeded(64, 16, 1);
        assert_eq!(payload.as_bytes().len(), 64);
        assert!(!payload.is_empty());
    }
}
