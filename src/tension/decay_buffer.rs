// =============================================================================
// Decay Buffer — fixed-capacity ring of recent tension samples
// =============================================================================
//
// Capacity is a power of two so slot indices wrap with a bitmask instead of a
// modulo. Once full, every push overwrites the oldest sample.

use crate::error::{ConfigResult, ConfigurationError};

/// Ring buffer of the most recent tension samples.
#[derive(Debug, Clone)]
pub struct DecayBuffer {
    slots: Vec<f64>,
    mask: usize,
    /// Next write position.
    head: usize,
    /// Oldest live sample.
    tail: usize,
    count: usize,
}

impl DecayBuffer {
    /// Allocate a zeroed ring. Fails unless `capacity` is a power of two.
    pub fn with_capacity(capacity: usize) -> ConfigResult<Self> {
        if !capacity.is_power_of_two() {
            return Err(ConfigurationError::CapacityNotPowerOfTwo(capacity));
        }
        Ok(Self {
            slots: vec![0.0; capacity],
            mask: capacity - 1,
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    #[inline]
    pub fn push(&mut self, sample: f64) {
        self.slots[self.head] = sample;
        self.head = (self.head + 1) & self.mask;
        if self.count < self.slots.len() {
            self.count += 1;
        } else {
            self.tail = (self.tail + 1) & self.mask;
        }
    }

    /// Mean of the live samples, `0.0` when empty.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum() / self.count as f64
    }

    /// Sum of the live samples.
    pub fn sum(&self) -> f64 {
        let (front, back) = self.live_slices();
        sum_unrolled(front) + sum_unrolled(back)
    }

    /// Live samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (front, back) = self.live_slices();
        front.iter().chain(back.iter()).copied()
    }

    /// The most recently pushed sample.
    pub fn latest(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.slots[self.head.wrapping_sub(1) & self.mask])
        }
    }

    /// Zero the storage and rewind the indices.
    pub fn clear(&mut self) {
        self.slots.fill(0.0);
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The live region as at most two contiguous slices.
    fn live_slices(&self) -> (&[f64], &[f64]) {
        let end = self.tail + self.count;
        if end <= self.slots.len() {
            let empty: &[f64] = &[];
            (&self.slots[self.tail..end], empty)
        } else {
            let wrapped = end - self.slots.len();
            (&self.slots[self.tail..], &self.slots[..wrapped])
        }
    }
}

/// Four independent accumulators; the remainder is added at the end.
#[inline]
fn sum_unrolled(xs: &[f64]) -> f64 {
    let mut acc = [0.0_f64; 4];
    let chunks = xs.chunks_exact(4);
    let rest = chunks.remainder();
    for c in chunks {
        acc[0] += c[0];
        acc[1] += c[1];
        acc[2] += c[2];
        acc[3] += c[3];
    }
    (acc[0] + acc[1]) + (acc[2] + acc[3]) + rest.iter().sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert_eq!(
            DecayBuffer::with_capacity(1000).unwrap_err(),
            ConfigurationError::CapacityNotPowerOfTwo(1000)
        );
        assert!(DecayBuffer::with_capacity(0).is_err());
        assert!(DecayBuffer::with_capacity(1).is_ok());
        assert!(DecayBuffer::with_capacity(1024).is_ok());
    }

    #[test]
    fn test_empty_average_is_zero() {
        let buf = DecayBuffer::with_capacity(8).unwrap();
        assert_eq!(buf.average(), 0.0);
        assert!(buf.latest().is_none());
    }

    #[test]
    fn test_overwrites_oldest_when_full() {
        let mut buf = DecayBuffer::with_capacity(4).unwrap();
        for v in 1..=6 {
            buf.push(v as f64);
        }
        assert_eq!(buf.len(), 4);
        assert!(buf.is_full());
        let live: Vec<f64> = buf.iter().collect();
        assert_eq!(live, vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(buf.latest(), Some(6.0));
        assert!((buf.average() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_count_never_exceeds_capacity() {
        let mut buf = DecayBuffer::with_capacity(16).unwrap();
        for i in 0..1000 {
            buf.push(i as f64 * 0.01);
            assert!(buf.len() <= buf.capacity());
        }
    }

    #[test]
    fn test_unrolled_sum_matches_naive_sum_across_wrap() {
        let mut buf = DecayBuffer::with_capacity(32).unwrap();
        for i in 0..45 {
            buf.push((i as f64).sin().abs());
        }
        let naive: f64 = buf.iter().sum();
        assert!((buf.sum() - naive).abs() < 1e-9);
    }

    #[test]
    fn test_clear_zeroes_storage() {
        let mut buf = DecayBuffer::with_capacity(4).unwrap();
        buf.push(1.0);
        buf.push(2.0);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.average(), 0.0);
        buf.push(3.0);
        assert_eq!(buf.iter().collect::<Vec<_>>(), vec![3.0]);
    }
}
