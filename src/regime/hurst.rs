// =============================================================================
// Hurst Exponent — Rescaled Range (R/S) over a bounded window
// =============================================================================
//
// The Hurst exponent H characterises the long-term memory of a series:
//
//   H >= 0.65  =>  strong trend
//   H >= 0.55  =>  trending / persistent
//   H ~  0.50  =>  random walk
//   H <  0.45  =>  mean-reverting
//   H <  0.40  =>  anti-persistent
//
// Algorithm (single window of n samples):
//   1. mean mu of the window
//   2. cumulative deviation Y_i = sum_{k<=i} (x_k - mu)
//   3. R = max(Y) - min(Y)
//   4. S = sample standard deviation (n - 1)
//   5. H = ln(R / S) / ln(n), clamped to [0, 1]
//
// Fewer than `min_samples` observations, or S == 0, yield the random-walk
// default of 0.5 rather than an estimate.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ConfigResult, ConfigurationError};
use crate::runtime_config::HurstConfig;
use crate::types::HurstInterpretation;

/// Maximum number of samples retained per series.
pub const DEFAULT_WINDOW: usize = 100;

/// Minimum number of samples before an estimate is attempted.
pub const DEFAULT_MIN_SAMPLES: usize = 20;

/// Exponent reported when the series carries no usable information.
pub const RANDOM_WALK_EXPONENT: f64 = 0.5;

/// Exponent plus its regime label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurstReading {
    pub exponent: f64,
    pub interpretation: HurstInterpretation,
}

impl HurstReading {
    pub fn from_exponent(exponent: f64) -> Self {
        Self {
            exponent,
            interpretation: HurstInterpretation::from_exponent(exponent),
        }
    }
}

impl Default for HurstReading {
    fn default() -> Self {
        Self::from_exponent(RANDOM_WALK_EXPONENT)
    }
}

/// Rescaled-range exponent of `samples`.
///
/// Returns `None` for fewer than two samples, for zero variance, or when the
/// ratio is not finite.
pub fn rescaled_range_exponent(samples: &[f64]) -> Option<f64> {
    let n = samples.len();
    if n < 2 {
        return None;
    }

    let mean = samples.iter().sum::<f64>() / n as f64;

    let mut running = 0.0_f64;
    let mut max_dev = f64::NEG_INFINITY;
    let mut min_dev = f64::INFINITY;
    let mut var_sum = 0.0_f64;

    for &x in samples {
        let dev = x - mean;
        running += dev;
        max_dev = max_dev.max(running);
        min_dev = min_dev.min(running);
        var_sum += dev * dev;
    }

    let std_dev = (var_sum / (n - 1) as f64).sqrt();
    // R/S is scale-free, so only spread that is indistinguishable from
    // rounding in the mean counts as zero.
    let magnitude = samples.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if std_dev == 0.0 || std_dev <= f64::EPSILON * n as f64 * magnitude {
        return None;
    }

    let range = max_dev - min_dev;
    let hurst = (range / std_dev).ln() / (n as f64).ln();

    if hurst.is_nan() {
        return None;
    }
    // ln(0) = -inf clamps to 0 along with any other negative estimate.
    Some(hurst.clamp(0.0, 1.0))
}

/// Online Hurst estimator over a FIFO window.
#[derive(Debug, Clone)]
pub struct HurstAnalyzer {
    samples: VecDeque<f64>,
    window: usize,
    min_samples: usize,
    current: HurstReading,
}

impl HurstAnalyzer {
    /// Analyzer with the default window (100) and warm-up (20).
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(DEFAULT_WINDOW),
            window: DEFAULT_WINDOW,
            min_samples: DEFAULT_MIN_SAMPLES,
            current: HurstReading::default(),
        }
    }

    pub fn with_window(window: usize, min_samples: usize) -> ConfigResult<Self> {
        if min_samples < 2 {
            return Err(ConfigurationError::WindowTooSmall {
                name: "hurst warm-up",
                value: min_samples,
                min: 2,
            });
        }
        if window < min_samples {
            return Err(ConfigurationError::WindowTooSmall {
                name: "hurst",
                value: window,
                min: min_samples,
            });
        }
        Ok(Self {
            samples: VecDeque::with_capacity(window),
            window,
            min_samples,
            current: HurstReading::default(),
        })
    }

    pub fn from_config(config: &HurstConfig) -> ConfigResult<Self> {
        Self::with_window(config.window, config.min_samples)
    }

    /// Push a sample (evicting the oldest beyond the window) and recompute.
    ///
    /// Non-finite samples are ignored and the previous reading is returned.
    pub fn update(&mut self, sample: f64) -> HurstReading {
        if !sample.is_finite() {
            trace!(sample, "Hurst: ignoring non-finite sample");
            return self.current;
        }

        self.samples.push_back(sample);
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }

        self.current = self.estimate();
        self.current
    }

    fn estimate(&mut self) -> HurstReading {
        let n = self.samples.len();
        if n < self.min_samples {
            trace!(len = n, min = self.min_samples, "Hurst: insufficient data");
            return HurstReading::default();
        }

        let exponent = match rescaled_range_exponent(self.samples.make_contiguous()) {
            Some(h) => h,
            None => {
                trace!(len = n, "Hurst: zero variance, defaulting to random walk");
                RANDOM_WALK_EXPONENT
            }
        };

        let reading = HurstReading::from_exponent(exponent);
        trace!(
            hurst = format!("{:.4}", exponent),
            interpretation = %reading.interpretation,
            len = n,
            "Hurst exponent computed"
        );
        reading
    }

    /// The reading produced by the last accepted sample.
    pub fn current(&self) -> HurstReading {
        self.current
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.current = HurstReading::default();
    }
}

impl Default for HurstAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic xorshift64 noise in [-0.5, 0.5].
    fn pseudorandom_noise(len: usize, seed: u64) -> Vec<f64> {
        let mut v = Vec::with_capacity(len);
        let mut state = seed;
        for _ in 0..len {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            v.push((state as f64 / u64::MAX as f64) - 0.5);
        }
        v
    }

    fn feed(analyzer: &mut HurstAnalyzer, samples: &[f64]) -> HurstReading {
        let mut last = analyzer.current();
        for &s in samples {
            last = analyzer.update(s);
        }
        last
    }

    #[test]
    fn test_warm_up_returns_exactly_half() {
        let mut a = HurstAnalyzer::new();
        for i in 0..19 {
            let r = a.update(i as f64 * 3.7);
            assert_eq!(r.exponent, 0.5);
            assert_eq!(r.interpretation, HurstInterpretation::RandomWalk);
        }
    }

    #[test]
    fn test_constant_stream_is_half_not_nan() {
        let mut a = HurstAnalyzer::new();
        let r = feed(&mut a, &[42.0; 150]);
        assert_eq!(r.exponent, 0.5);
        assert!(r.exponent.is_finite());
    }

    #[test]
    fn test_linear_ramp_is_strong_trend() {
        let ramp: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let mut a = HurstAnalyzer::new();
        let r = feed(&mut a, &ramp);
        assert!(r.exponent > 0.65, "ramp H = {:.4}", r.exponent);
        assert_eq!(r.interpretation, HurstInterpretation::StrongTrend);
    }

    #[test]
    fn test_constant_stream_with_inexact_mean_is_half() {
        // 0.1 is not representable, so the mean carries rounding error.
        assert_eq!(rescaled_range_exponent(&[0.1; 100]), None);
        let mut a = HurstAnalyzer::new();
        assert_eq!(feed(&mut a, &[0.1; 100]).exponent, 0.5);
    }

    #[test]
    fn test_exponent_is_scale_invariant() {
        let ramp: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let base = rescaled_range_exponent(&ramp).unwrap();
        for scale in [1e-18, 1e-9, 1e6] {
            let scaled: Vec<f64> = ramp.iter().map(|x| x * scale).collect();
            let h = rescaled_range_exponent(&scaled).unwrap();
            assert!((h - base).abs() < 1e-9, "scale {scale}: H = {h:.6} vs {base:.6}");
        }

        let mut a = HurstAnalyzer::new();
        let tiny: Vec<f64> = ramp.iter().map(|x| x * 1e-18).collect();
        let r = feed(&mut a, &tiny);
        assert_eq!(r.interpretation, HurstInterpretation::StrongTrend);
    }

    #[test]
    fn test_alternating_series_is_anti_persistent() {
        let alt: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut a = HurstAnalyzer::new();
        let r = feed(&mut a, &alt);
        assert!(r.exponent < 0.40, "alternating H = {:.4}", r.exponent);
        assert_eq!(r.interpretation, HurstInterpretation::AntiPersistent);
    }

    #[test]
    fn test_exponent_always_in_unit_interval() {
        let mut a = HurstAnalyzer::new();
        let noise = pseudorandom_noise(500, 123_456_789);
        for (i, &x) in noise.iter().enumerate() {
            // Mix bursts and outliers into the stream.
            let sample = if i % 97 == 0 { x * 1e6 } else { x };
            let r = a.update(sample);
            assert!((0.0..=1.0).contains(&r.exponent), "H={:.4}", r.exponent);
        }
    }

    #[test]
    fn test_window_is_bounded_fifo() {
        let mut a = HurstAnalyzer::new();
        feed(&mut a, &pseudorandom_noise(250, 7));
        assert_eq!(a.len(), DEFAULT_WINDOW);
    }

    #[test]
    fn test_non_finite_sample_ignored() {
        let mut a = HurstAnalyzer::new();
        let before = feed(&mut a, &pseudorandom_noise(30, 99));
        let after = a.update(f64::NAN);
        assert_eq!(before, after);
        assert_eq!(a.len(), 30);
    }

    #[test]
    fn test_reset_returns_to_default() {
        let mut a = HurstAnalyzer::new();
        feed(&mut a, &(0..50).map(|i| i as f64).collect::<Vec<_>>());
        a.reset();
        assert!(a.is_empty());
        assert_eq!(a.current(), HurstReading::default());
    }

    #[test]
    fn test_custom_window_validation() {
        assert!(HurstAnalyzer::with_window(10, 20).is_err());
        assert!(HurstAnalyzer::with_window(10, 1).is_err());
        let a = HurstAnalyzer::with_window(32, 8).unwrap();
        assert_eq!(a.window(), 32);
    }

    #[test]
    fn test_rescaled_range_determinism() {
        let noise = pseudorandom_noise(100, 42);
        assert_eq!(rescaled_range_exponent(&noise), rescaled_range_exponent(&noise));
        assert!(rescaled_range_exponent(&[1.0]).is_none());
        assert!(rescaled_range_exponent(&[3.0; 10]).is_none());
    }
}
