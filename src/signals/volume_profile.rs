// =============================================================================
// Volume Profile — bounded per-symbol volume history
// =============================================================================

use crate::error::ConfigResult;
use crate::regime::{HurstAnalyzer, HurstReading};
use crate::runtime_config::HurstConfig;

/// FIFO volume history for one symbol. Exists only to feed that symbol's
/// Hurst estimate.
#[derive(Debug, Clone, Default)]
pub struct VolumeProfile {
    hurst: HurstAnalyzer,
}

impl VolumeProfile {
    pub fn new(config: &HurstConfig) -> ConfigResult<Self> {
        Ok(Self {
            hurst: HurstAnalyzer::from_config(config)?,
        })
    }

    /// Append a volume sample and return the refreshed Hurst reading.
    pub fn record(&mut self, volume: f64) -> HurstReading {
        self.hurst.update(volume)
    }

    pub fn hurst(&self) -> HurstReading {
        self.hurst.current()
    }

    pub fn len(&self) -> usize {
        self.hurst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hurst.is_empty()
    }
}
