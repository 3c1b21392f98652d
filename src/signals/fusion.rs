// =============================================================================
// Signal Fusion Engine — four weak indicators into one categorical signal
// =============================================================================
//
// Per symbol and tick, from a ticker snapshot:
//
//   vwap       = (high + low + price) / 3
//   spread_pct = (high - low) / price
//
//   hurst       : H of the volume profile; H > 0.65 => +1, H < 0.35 => -1, else 0
//   tension     : t = clamp(spread_pct * 10, 0, 1);      signal = (1 - t) * 2 - 1
//   vwap        : d = (price - vwap) / vwap;              signal = clamp(d * 10, -1, 1)
//   compression : c = clamp(1 - spread_pct * 20, 0, 1);  signal = c * 2 - 1
//
//   fused = 0.35 * hurst + 0.30 * vwap + 0.20 * tension + 0.15 * compression
//
// A ticker whose price cannot anchor a ratio yields neutral 0.5 tension and
// compression metrics and a zero VWAP deviation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigResult;
use crate::runtime_config::{FusionConfig, HurstConfig};
use crate::signals::volume_profile::VolumeProfile;
use crate::signals::weighted_score::{ComponentSignals, SignalContribution, WeightedScorer};
use crate::types::{SignalCategory, TickerSnapshot};

/// Hurst exponent above which volume persistence counts as bullish.
const HURST_BULLISH: f64 = 0.65;
/// Hurst exponent below which volume persistence counts as bearish.
const HURST_BEARISH: f64 = 0.35;

/// Metric value used when the snapshot cannot produce one.
const NEUTRAL_METRIC: f64 = 0.5;

/// Raw metrics behind the fused value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalComponents {
    /// Hurst exponent of the volume profile.
    pub hurst: f64,
    /// Spread-implied tension in [0, 1].
    pub tension_proxy: f64,
    /// Relative distance of price from VWAP.
    pub vwap_deviation: f64,
    /// Spread compression in [0, 1].
    pub compression: f64,
}

/// Fused categorical signal for one symbol and tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedSignal {
    pub category: SignalCategory,
    pub fused_value: f64,
    pub components: SignalComponents,
    pub contributions: Vec<SignalContribution>,
}

pub struct SignalFusionEngine {
    profiles: HashMap<String, VolumeProfile>,
    latest: HashMap<String, FusedSignal>,
    scorer: WeightedScorer,
    hurst_config: HurstConfig,
}

impl SignalFusionEngine {
    pub fn new(config: &FusionConfig) -> ConfigResult<Self> {
        // Surface a bad window at construction rather than on first fuse.
        VolumeProfile::new(&config.hurst)?;
        Ok(Self {
            profiles: HashMap::new(),
            latest: HashMap::new(),
            scorer: WeightedScorer::new(config.weights)?,
            hurst_config: config.hurst,
        })
    }

    /// Record the snapshot's volume in the symbol's profile and fuse the four
    /// component signals.
    pub fn fuse(&mut self, symbol: &str, snapshot: &TickerSnapshot) -> FusedSignal {
        let hurst_config = self.hurst_config;
        let profile = self
            .profiles
            .entry(symbol.to_string())
            .or_insert_with(|| VolumeProfile::new(&hurst_config).unwrap_or_default());
        let hurst = profile.record(snapshot.volume).exponent;

        let (components, signals) = derive_signals(hurst, snapshot);
        let scoring = self.scorer.score(&signals);
        let category = SignalCategory::from_fused(scoring.total_score);

        debug!(
            symbol,
            category = %category,
            fused = format!("{:.4}", scoring.total_score),
            hurst = format!("{:.4}", hurst),
            tension = format!("{:.4}", components.tension_proxy),
            vwap_dev = format!("{:.4}", components.vwap_deviation),
            compression = format!("{:.4}", components.compression),
            "Signal fused"
        );

        let fused = FusedSignal {
            category,
            fused_value: scoring.total_score,
            components,
            contributions: scoring.signal_contributions,
        };
        self.latest.insert(symbol.to_string(), fused.clone());
        fused
    }

    /// The most recent fused signal for `symbol`.
    pub fn last_signal(&self, symbol: &str) -> Option<&FusedSignal> {
        self.latest.get(symbol)
    }

    pub fn latest(&self) -> &HashMap<String, FusedSignal> {
        &self.latest
    }

    /// Symbols with a volume profile.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.profiles.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn history_len(&self, symbol: &str) -> usize {
        self.profiles.get(symbol).map_or(0, VolumeProfile::len)
    }

    /// Drop all state held for `symbol`.
    pub fn forget(&mut self, symbol: &str) {
        self.profiles.remove(symbol);
        self.latest.remove(symbol);
    }

    pub fn reset(&mut self) {
        self.profiles.clear();
        self.latest.clear();
    }
}

impl Default for SignalFusionEngine {
    fn default() -> Self {
        Self {
            profiles: HashMap::new(),
            latest: HashMap::new(),
            scorer: WeightedScorer::default(),
            hurst_config: HurstConfig::default(),
        }
    }
}

fn hurst_signal(h: f64) -> f64 {
    if h > HURST_BULLISH {
        1.0
    } else if h < HURST_BEARISH {
        -1.0
    } else {
        0.0
    }
}

fn derive_signals(hurst: f64, snapshot: &TickerSnapshot) -> (SignalComponents, ComponentSignals) {
    let (tension_proxy, compression) = match snapshot.spread_pct() {
        Some(spread_pct) => (
            (spread_pct * 10.0).clamp(0.0, 1.0),
            (1.0 - spread_pct * 20.0).clamp(0.0, 1.0),
        ),
        None => (NEUTRAL_METRIC, NEUTRAL_METRIC),
    };

    let vwap = snapshot.vwap();
    let vwap_deviation = if vwap > 0.0 && vwap.is_finite() {
        let deviation = (snapshot.price - vwap) / vwap;
        if deviation.is_finite() {
            deviation
        } else {
            0.0
        }
    } else {
        0.0
    };

    let components = SignalComponents {
        hurst,
        tension_proxy,
        vwap_deviation,
        compression,
    };
    let signals = ComponentSignals {
        hurst: hurst_signal(hurst),
        vwap: (vwap_deviation * 10.0).clamp(-1.0, 1.0),
        tension: (1.0 - tension_proxy) * 2.0 - 1.0,
        compression: compression * 2.0 - 1.0,
    };
    (components, signals)
}
