// =============================================================================
// Shared types used across the tension engine
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One tracked component's tension reading for the current tick.
///
/// Mutated in place by [`crate::tension::TensionDecayEngine::decay`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Accumulated stress. Never negative after a decay step.
    pub tension: f64,
    /// Stability in [0, 1]; higher values damp tension faster.
    pub stability: f64,
}

impl Component {
    pub fn new(tension: f64, stability: f64) -> Self {
        Self { tension, stability }
    }

    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.tension.is_finite() && self.stability.is_finite()
    }
}

/// Upstream component record as it arrives from the ingestion side, with
/// every field optional.
///
/// Deserialization never fails: a field that is missing or not a number
/// becomes `None`, and an entry that is not an object has no fields at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RawComponent {
    pub tension: Option<f64>,
    pub stability: Option<f64>,
}

impl RawComponent {
    pub fn from_value(value: &Value) -> Self {
        Self {
            tension: value.get("tension").and_then(Value::as_f64),
            stability: value.get("stability").and_then(Value::as_f64),
        }
    }
}

impl<'de> Deserialize<'de> for RawComponent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// A batch entry handed to the decay engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentReading {
    Reading(Component),
    /// Malformed upstream entry. Skipped by the decay engine.
    Skip,
}

impl ComponentReading {
    pub fn new(tension: f64, stability: f64) -> Self {
        Self::Reading(Component::new(tension, stability))
    }

    /// The component, if this entry is usable.
    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Reading(c) if c.is_well_formed() => Some(c),
            _ => None,
        }
    }

    /// Current tension of a usable entry.
    pub fn tension(&self) -> Option<f64> {
        self.component().map(|c| c.tension)
    }
}

impl From<RawComponent> for ComponentReading {
    fn from(raw: RawComponent) -> Self {
        match (raw.tension, raw.stability) {
            (Some(tension), Some(stability)) if tension.is_finite() && stability.is_finite() => {
                Self::new(tension, stability)
            }
            _ => Self::Skip,
        }
    }
}

impl From<Component> for ComponentReading {
    fn from(c: Component) -> Self {
        Self::Reading(c)
    }
}

/// Price/volume record for one symbol at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub price: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl TickerSnapshot {
    pub fn new(price: f64, high: f64, low: f64, volume: f64) -> Self {
        Self {
            price,
            high,
            low,
            volume,
        }
    }

    /// Typical price `(high + low + price) / 3`, used as the VWAP proxy.
    #[inline]
    pub fn vwap(&self) -> f64 {
        (self.high + self.low + self.price) / 3.0
    }

    #[inline]
    pub fn spread(&self) -> f64 {
        self.high - self.low
    }

    /// Spread as a fraction of price. `None` when the price cannot anchor a
    /// ratio (zero, negative or non-finite).
    pub fn spread_pct(&self) -> Option<f64> {
        if self.price > 0.0 && self.price.is_finite() {
            let pct = self.spread() / self.price;
            pct.is_finite().then_some(pct)
        } else {
            None
        }
    }
}

/// Persistence regime derived from a Hurst exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HurstInterpretation {
    AntiPersistent,
    MeanReverting,
    RandomWalk,
    Trending,
    StrongTrend,
}

impl HurstInterpretation {
    /// Classify an exponent. Thresholds are exclusive upper bounds.
    pub fn from_exponent(h: f64) -> Self {
        if h < 0.40 {
            Self::AntiPersistent
        } else if h < 0.45 {
            Self::MeanReverting
        } else if h < 0.55 {
            Self::RandomWalk
        } else if h < 0.65 {
            Self::Trending
        } else {
            Self::StrongTrend
        }
    }
}

impl Default for HurstInterpretation {
    fn default() -> Self {
        Self::RandomWalk
    }
}

impl std::fmt::Display for HurstInterpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AntiPersistent => write!(f, "anti_persistent"),
            Self::MeanReverting => write!(f, "mean_reverting"),
            Self::RandomWalk => write!(f, "random_walk"),
            Self::Trending => write!(f, "trending"),
            Self::StrongTrend => write!(f, "strong_trend"),
        }
    }
}

/// Categorical output of signal fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Bullish,
    Consolidating,
    Accumulation,
    Neutral,
    ResistanceTest,
    Bearish,
}

impl SignalCategory {
    /// Map a fused value onto a category. First match wins, so the
    /// accumulation band only covers `(0.05, 0.1]`.
    pub fn from_fused(fused: f64) -> Self {
        if fused > 0.3 {
            Self::Bullish
        } else if fused > 0.1 {
            Self::Consolidating
        } else if fused > 0.05 && fused <= 0.1 {
            Self::Accumulation
        } else if fused > -0.1 {
            Self::Neutral
        } else if fused > -0.3 {
            Self::ResistanceTest
        } else {
            Self::Bearish
        }
    }
}

impl Default for SignalCategory {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Consolidating => write!(f, "consolidating"),
            Self::Accumulation => write!(f, "accumulation"),
            Self::Neutral => write!(f, "neutral"),
            Self::ResistanceTest => write!(f, "resistance_test"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_component_with_missing_field_becomes_skip() {
        let raw = RawComponent {
            tension: Some(0.4),
            stability: None,
        };
        assert_eq!(ComponentReading::from(raw), ComponentReading::Skip);

        let raw = RawComponent {
            tension: Some(f64::NAN),
            stability: Some(0.5),
        };
        assert_eq!(ComponentReading::from(raw), ComponentReading::Skip);

        let raw = RawComponent {
            tension: Some(0.4),
            stability: Some(0.5),
        };
        assert_eq!(ComponentReading::from(raw), ComponentReading::new(0.4, 0.5));
    }

    #[test]
    fn test_raw_component_deserialises_from_partial_json() {
        let raw: RawComponent = serde_json::from_str(r#"{ "tension": 0.7 }"#).unwrap();
        assert_eq!(raw.tension, Some(0.7));
        assert_eq!(raw.stability, None);
    }

    #[test]
    fn test_malformed_raw_components_deserialise_as_skip() {
        let raws: Vec<RawComponent> = serde_json::from_str(
            r#"[
                { "tension": "oops", "stability": 0.5 },
                null,
                5,
                { "tension": 1.0, "stability": [0.5] },
                { "tension": 1.0, "stability": 0.5 }
            ]"#,
        )
        .unwrap();
        let readings: Vec<ComponentReading> =
            raws.into_iter().map(ComponentReading::from).collect();
        assert_eq!(
            readings,
            vec![
                ComponentReading::Skip,
                ComponentReading::Skip,
                ComponentReading::Skip,
                ComponentReading::Skip,
                ComponentReading::new(1.0, 0.5),
            ]
        );
    }

    #[test]
    fn test_spread_pct_requires_positive_price() {
        assert!(TickerSnapshot::new(0.0, 1.0, 0.5, 10.0).spread_pct().is_none());
        assert!(TickerSnapshot::new(-5.0, 1.0, 0.5, 10.0).spread_pct().is_none());
        let pct = TickerSnapshot::new(100.0, 102.0, 98.0, 10.0)
            .spread_pct()
            .unwrap();
        assert!((pct - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_hurst_interpretation_bands() {
        assert_eq!(HurstInterpretation::from_exponent(0.10), HurstInterpretation::AntiPersistent);
        assert_eq!(HurstInterpretation::from_exponent(0.40), HurstInterpretation::MeanReverting);
        assert_eq!(HurstInterpretation::from_exponent(0.45), HurstInterpretation::RandomWalk);
        assert_eq!(HurstInterpretation::from_exponent(0.55), HurstInterpretation::Trending);
        assert_eq!(HurstInterpretation::from_exponent(0.65), HurstInterpretation::StrongTrend);
        assert_eq!(HurstInterpretation::from_exponent(1.00), HurstInterpretation::StrongTrend);
    }

    // The accumulation band is narrow and sits between consolidating and
    // neutral. These boundaries are pinned as documented, not re-derived.
    #[test]
    fn test_signal_category_boundaries_are_literal() {
        assert_eq!(SignalCategory::from_fused(0.31), SignalCategory::Bullish);
        assert_eq!(SignalCategory::from_fused(0.30), SignalCategory::Consolidating);
        assert_eq!(SignalCategory::from_fused(0.11), SignalCategory::Consolidating);
        assert_eq!(SignalCategory::from_fused(0.10), SignalCategory::Accumulation);
        assert_eq!(SignalCategory::from_fused(0.06), SignalCategory::Accumulation);
        assert_eq!(SignalCategory::from_fused(0.05), SignalCategory::Neutral);
        assert_eq!(SignalCategory::from_fused(0.0), SignalCategory::Neutral);
        assert_eq!(SignalCategory::from_fused(-0.10), SignalCategory::ResistanceTest);
        assert_eq!(SignalCategory::from_fused(-0.30), SignalCategory::Bearish);
        assert_eq!(SignalCategory::from_fused(-1.0), SignalCategory::Bearish);
    }

    #[test]
    fn test_labels_serialise_snake_case() {
        let json = serde_json::to_string(&SignalCategory::ResistanceTest).unwrap();
        assert_eq!(json, "\"resistance_test\"");
        assert_eq!(format!("{}", HurstInterpretation::StrongTrend), "strong_trend");
    }
}
