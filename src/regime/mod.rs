// =============================================================================
// Regime Module
// =============================================================================
//
// Persistence classification of a bounded series via the Hurst exponent
// (rescaled-range analysis).

pub mod hurst;

pub use hurst::{rescaled_range_exponent, HurstAnalyzer, HurstReading};
