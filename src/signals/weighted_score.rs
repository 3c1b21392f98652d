// =============================================================================
// Weighted Scorer — fixed-weight aggregation of directional signals
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, ConfigurationError};

fn default_hurst_weight() -> f64 {
    0.35
}

fn default_vwap_weight() -> f64 {
    0.30
}

fn default_tension_weight() -> f64 {
    0.20
}

fn default_compression_weight() -> f64 {
    0.15
}

/// Weight of each component signal in the fused value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    #[serde(default = "default_hurst_weight")]
    pub hurst: f64,
    #[serde(default = "default_vwap_weight")]
    pub vwap: f64,
    #[serde(default = "default_tension_weight")]
    pub tension: f64,
    #[serde(default = "default_compression_weight")]
    pub compression: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            hurst: default_hurst_weight(),
            vwap: default_vwap_weight(),
            tension: default_tension_weight(),
            compression: default_compression_weight(),
        }
    }
}

impl FusionWeights {
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("hurst", self.hurst),
            ("vwap", self.vwap),
            ("tension", self.tension),
            ("compression", self.compression),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// The four directional inputs, each in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSignals {
    pub hurst: f64,
    pub vwap: f64,
    pub tension: f64,
    pub compression: f64,
}

/// The contribution of a single signal to the fused value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub name: String,
    pub weight: f64,
    /// Signal value in [-1, 1].
    pub direction: f64,
    pub contribution: f64,
}

/// Weighted sum plus its breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub total_score: f64,
    pub signal_contributions: Vec<SignalContribution>,
}

#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: FusionWeights,
}

impl WeightedScorer {
    pub fn new(weights: FusionWeights) -> ConfigResult<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Weighted sum of `signals`, clamped to [-1, 1].
    pub fn score(&self, signals: &ComponentSignals) -> ScoringResult {
        let w = &self.weights;
        let inputs = [
            ("hurst", w.hurst, signals.hurst),
            ("vwap", w.vwap, signals.vwap),
            ("tension", w.tension, signals.tension),
            ("compression", w.compression, signals.compression),
        ];

        let mut contributions = Vec::with_capacity(inputs.len());
        let mut total_score = 0.0;

        for (name, weight, direction) in inputs {
            let contribution = weight * direction;
            contributions.push(SignalContribution {
                name: name.to_string(),
                weight,
                direction,
                contribution,
            });
            total_score += contribution;
        }

        ScoringResult {
            total_score: total_score.clamp(-1.0, 1.0),
            signal_contributions: contributions,
        }
    }

    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
        }
    }
}
