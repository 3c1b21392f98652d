// =============================================================================
// Damping Cache — memoized exp(-stability) per quantized stability
// =============================================================================
//
// Stability is quantized to an integer key in 0..=100, so the whole key space
// fits in a fixed array and lookups never hash. Slots fill lazily and are
// never invalidated.

/// Number of distinct quantized stability keys (0..=100).
pub const DAMPING_KEYS: usize = 101;

/// Quantize a stability value to its cache key, `floor(stability * 100)`.
///
/// Out-of-range input is clamped into [0, 1] first.
#[inline]
pub fn stability_key(stability: f64) -> usize {
    if !stability.is_finite() {
        return 0;
    }
    (stability.clamp(0.0, 1.0) * 100.0).floor() as usize
}

#[derive(Debug, Clone)]
pub struct DampingCache {
    slots: [Option<f64>; DAMPING_KEYS],
    filled: usize,
}

impl DampingCache {
    pub fn new() -> Self {
        Self {
            slots: [None; DAMPING_KEYS],
            filled: 0,
        }
    }

    /// Damping factor for `stability`, computing it on first use of its key.
    #[inline]
    pub fn damping(&mut self, stability: f64) -> f64 {
        let key = stability_key(stability);
        match self.slots[key] {
            Some(d) => d,
            None => {
                let d = (-(key as f64) / 100.0).exp();
                self.slots[key] = Some(d);
                self.filled += 1;
                d
            }
        }
    }

    /// Number of keys computed so far.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }
}

impl Default for DampingCache {
    fn default() -> Self {
        Self::new()
    }
}
