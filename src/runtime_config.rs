// =============================================================================
// Engine Configuration — construction parameters with atomic save
// =============================================================================
//
// Every tunable parameter of the tension engines lives here. Engines read
// their section once at construction and never change afterwards; a new
// configuration takes effect only by building new engines.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dynamics::{DynamicalTensionModel, ForcingScales};
use crate::error::ConfigResult;
use crate::regime::HurstAnalyzer;
use crate::signals::{FusionWeights, SignalFusionEngine};
use crate::tension::TensionDecayEngine;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_decay_rate() -> f64 {
    0.1
}

fn default_noise_floor() -> f64 {
    crate::tension::NOISE_FLOOR
}

fn default_buffer_capacity() -> usize {
    1024
}

fn default_hurst_window() -> usize {
    crate::regime::hurst::DEFAULT_WINDOW
}

fn default_hurst_min_samples() -> usize {
    crate::regime::hurst::DEFAULT_MIN_SAMPLES
}

fn default_alpha() -> f64 {
    crate::dynamics::DEFAULT_ALPHA
}

fn default_beta() -> f64 {
    crate::dynamics::DEFAULT_BETA
}

fn default_max_dt() -> f64 {
    crate::dynamics::MAX_DT
}

fn default_symbols() -> Vec<String> {
    Vec::new()
}

fn default_tick_interval_ms() -> u64 {
    0
}

// =============================================================================
// Sections
// =============================================================================

/// Per-component decay parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Exponential decay rate per time unit.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,

    /// Tensions below this snap to zero.
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f64,

    /// Ring capacity. Must be a power of two.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            decay_rate: default_decay_rate(),
            noise_floor: default_noise_floor(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

/// Window sizing for a Hurst analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurstConfig {
    /// Maximum retained samples (FIFO).
    #[serde(default = "default_hurst_window")]
    pub window: usize,

    /// Samples required before an estimate replaces the 0.5 default.
    #[serde(default = "default_hurst_min_samples")]
    pub min_samples: usize,
}

impl Default for HurstConfig {
    fn default() -> Self {
        Self {
            window: default_hurst_window(),
            min_samples: default_hurst_min_samples(),
        }
    }
}

/// Coefficients of `dT/dt = alpha * shock - beta * liquidity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Largest Euler step per call.
    #[serde(default = "default_max_dt")]
    pub max_dt: f64,

    /// Normalization of raw ticker values into shock / liquidity.
    #[serde(default)]
    pub scales: ForcingScales,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            max_dt: default_max_dt(),
            scales: ForcingScales::default(),
        }
    }
}

/// Signal fusion weights and the per-symbol volume window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default)]
    pub weights: FusionWeights,

    /// Volume-profile window feeding each symbol's Hurst estimate.
    #[serde(default)]
    pub hurst: HurstConfig,
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the tension engines.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub decay: DecayConfig,

    /// Analyzer over the rolling average tension.
    #[serde(default)]
    pub hurst: HurstConfig,

    #[serde(default)]
    pub dynamics: DynamicsConfig,

    #[serde(default)]
    pub fusion: FusionConfig,

    /// Symbols fed to fusion and dynamics. Empty tracks every symbol that
    /// arrives.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Pause between replayed frames; 0 replays as fast as input arrives.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay: DecayConfig::default(),
            hurst: HurstConfig::default(),
            dynamics: DynamicsConfig::default(),
            fusion: FusionConfig::default(),
            symbols: default_symbols(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            decay_rate = config.decay.decay_rate,
            capacity = config.decay.buffer_capacity,
            alpha = config.dynamics.alpha,
            beta = config.dynamics.beta,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Check every section by building the engine it configures.
    pub fn validate(&self) -> ConfigResult<()> {
        TensionDecayEngine::from_config(&self.decay)?;
        HurstAnalyzer::from_config(&self.hurst)?;
        DynamicalTensionModel::from_config(&self.dynamics)?;
        SignalFusionEngine::new(&self.fusion)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;

    #[test]
    fn test_default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert!((cfg.decay.decay_rate - 0.1).abs() < f64::EPSILON);
        assert!((cfg.decay.noise_floor - 0.01).abs() < f64::EPSILON);
        assert_eq!(cfg.decay.buffer_capacity, 1024);
        assert_eq!(cfg.hurst.window, 100);
        assert_eq!(cfg.hurst.min_samples, 20);
        assert!((cfg.dynamics.alpha - 0.8).abs() < f64::EPSILON);
        assert!((cfg.dynamics.beta - 0.6).abs() < f64::EPSILON);
        assert!((cfg.dynamics.max_dt - 0.2).abs() < f64::EPSILON);
        assert!((cfg.fusion.weights.hurst - 0.35).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_deserialise_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn test_deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "decay": { "decay_rate": 0.25 },
            "dynamics": { "scales": { "volatility_scale": 0.1 } },
            "symbols": ["ETHUSDT"]
        }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert!((cfg.decay.decay_rate - 0.25).abs() < f64::EPSILON);
        assert_eq!(cfg.decay.buffer_capacity, 1024);
        assert!((cfg.dynamics.scales.volatility_scale - 0.1).abs() < f64::EPSILON);
        assert!((cfg.dynamics.scales.activity_volume - 1_000_000.0).abs() < f64::EPSILON);
        assert_eq!(cfg.symbols, vec!["ETHUSDT"]);
    }

    #[test]
    fn test_validate_rejects_non_power_of_two_capacity() {
        let mut cfg = EngineConfig::default();
        cfg.decay.buffer_capacity = 1000;
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::CapacityNotPowerOfTwo(1000))
        );
    }

    #[test]
    fn test_validate_rejects_zero_beta() {
        let mut cfg = EngineConfig::default();
        cfg.dynamics.beta = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::InvalidCoefficient { name: "beta", .. })
        ));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("tension-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.json");

        let mut cfg = EngineConfig::default();
        cfg.symbols = vec!["BTCUSDT".into()];
        cfg.decay.decay_rate = 0.4;
        cfg.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(EngineConfig::load("/nonexistent/tension_config.json").is_err());
    }
}
