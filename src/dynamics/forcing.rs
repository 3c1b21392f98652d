// =============================================================================
// Market Forcing — shock / liquidity normalization from ticker data
// =============================================================================
//
// The dynamical model is driven by two scalars in [0, 1]:
//
//   shock     = 0.7 * volatility         + 0.3 * volume_activity
//   liquidity = 0.6 * spread_compression + 0.4 * volume_depth
//
// Each sub-term is clamped to [0, 1] before blending. Deriving the sub-terms
// from a ticker is stateless:
//
//   range_pct          = (high - low) / price
//   volatility         = range_pct / volatility_scale
//   volume_activity    = volume / activity_volume
//   spread_compression = 1 - range_pct * 20
//   volume_depth       = volume / depth_volume
//
// A ticker whose price cannot anchor a ratio contributes zero volatility and
// a neutral 0.5 compression.

use serde::{Deserialize, Serialize};

use crate::types::TickerSnapshot;

const SHOCK_VOLATILITY_WEIGHT: f64 = 0.7;
const SHOCK_ACTIVITY_WEIGHT: f64 = 0.3;
const LIQUIDITY_COMPRESSION_WEIGHT: f64 = 0.6;
const LIQUIDITY_DEPTH_WEIGHT: f64 = 0.4;

/// Spread fraction at which compression reaches zero is `1 / 20`.
const COMPRESSION_SLOPE: f64 = 20.0;

/// Clamp into [0, 1], mapping NaN to 0.
#[inline]
pub(crate) fn unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Reference magnitudes used to normalize raw ticker values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcingScales {
    /// Range fraction that counts as full volatility.
    pub volatility_scale: f64,
    /// Volume that counts as full activity.
    pub activity_volume: f64,
    /// Volume that counts as full book depth.
    pub depth_volume: f64,
}

impl Default for ForcingScales {
    fn default() -> Self {
        Self {
            volatility_scale: 0.05,
            activity_volume: 1_000_000.0,
            depth_volume: 5_000_000.0,
        }
    }
}

/// The four raw sub-terms before clamping and blending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForcingTerms {
    pub volatility: f64,
    pub volume_activity: f64,
    pub spread_compression: f64,
    pub volume_depth: f64,
}

impl ForcingTerms {
    pub fn from_ticker(ticker: &TickerSnapshot, scales: &ForcingScales) -> Self {
        let (volatility, spread_compression) = match ticker.spread_pct() {
            Some(range_pct) => (
                ratio(range_pct, scales.volatility_scale),
                1.0 - range_pct * COMPRESSION_SLOPE,
            ),
            None => (0.0, 0.5),
        };

        Self {
            volatility,
            volume_activity: ratio(ticker.volume, scales.activity_volume),
            spread_compression,
            volume_depth: ratio(ticker.volume, scales.depth_volume),
        }
    }

    pub fn blend(&self) -> MarketForcing {
        MarketForcing {
            shock: SHOCK_VOLATILITY_WEIGHT * unit(self.volatility)
                + SHOCK_ACTIVITY_WEIGHT * unit(self.volume_activity),
            liquidity: LIQUIDITY_COMPRESSION_WEIGHT * unit(self.spread_compression)
                + LIQUIDITY_DEPTH_WEIGHT * unit(self.volume_depth),
        }
    }
}

#[inline]
fn ratio(value: f64, scale: f64) -> f64 {
    if scale > 0.0 {
        value / scale
    } else {
        0.0
    }
}

/// Normalized drivers of the tension ODE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketForcing {
    pub shock: f64,
    pub liquidity: f64,
}

impl MarketForcing {
    pub fn from_ticker(ticker: &TickerSnapshot, scales: &ForcingScales) -> Self {
        ForcingTerms::from_ticker(ticker, scales).blend()
    }

    /// Component-wise mean over several tickers. `None` for an empty set.
    pub fn mean<'a>(
        tickers: impl IntoIterator<Item = &'a TickerSnapshot>,
        scales: &ForcingScales,
    ) -> Option<Self> {
        let mut shock = 0.0;
        let mut liquidity = 0.0;
        let mut count = 0usize;
        for t in tickers {
            let f = Self::from_ticker(t, scales);
            shock += f.shock;
            liquidity += f.liquidity;
            count += 1;
        }
        (count > 0).then(|| Self {
            shock: shock / count as f64,
            liquidity: liquidity / count as f64,
        })
    }
}
