// =============================================================================
// Tension Decay Engine — exponential decay with stability damping
// =============================================================================
//
// Each tick every valid component decays independently:
//
//   decay_factor = exp(-decay_rate * dt)
//   tension      = 0                                   if tension < noise_floor
//   tension      = max(0, tension * decay_factor * exp(-stability))  otherwise
//
// The updated tension of every component is pushed into the ring buffer, and
// the call returns the rolling average over the ring.
//
// Degenerate input never fails: an invalid `dt` turns the call into a no-op
// that reports the last known average, and malformed entries are skipped.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ConfigResult, ConfigurationError};
use crate::instrumentation::{AtomicTickCounter, TickCounter};
use crate::runtime_config::DecayConfig;
use crate::tension::damping::DampingCache;
use crate::tension::decay_buffer::DecayBuffer;
use crate::types::{Component, ComponentReading};

/// Tensions below this are snapped to zero instead of decaying forever.
pub const NOISE_FLOOR: f64 = 0.01;

/// Components are walked in groups of this size. Grouping has no effect on
/// results.
const BATCH_LANES: usize = 8;

/// Cumulative instrumentation for one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayStats {
    /// Components that went through a decay step (snapped ones included).
    pub processed: u64,
    /// Malformed batch entries.
    pub skipped: u64,
    /// Components snapped to zero by the noise floor.
    pub snapped: u64,
}

pub struct TensionDecayEngine<C: TickCounter = AtomicTickCounter> {
    decay_rate: f64,
    noise_floor: f64,
    buffer: DecayBuffer,
    damping: DampingCache,
    processed: C,
    skipped: C,
    snapped: C,
}

impl TensionDecayEngine<AtomicTickCounter> {
    /// Engine with the default noise floor.
    pub fn new(decay_rate: f64, capacity: usize) -> ConfigResult<Self> {
        Self::with_noise_floor(decay_rate, NOISE_FLOOR, capacity)
    }

    pub fn from_config(config: &DecayConfig) -> ConfigResult<Self> {
        Self::with_noise_floor(config.decay_rate, config.noise_floor, config.buffer_capacity)
    }
}

impl<C: TickCounter> TensionDecayEngine<C> {
    /// Build an engine with an explicit noise floor and counter type.
    pub fn with_noise_floor(
        decay_rate: f64,
        noise_floor: f64,
        capacity: usize,
    ) -> ConfigResult<Self> {
        if !decay_rate.is_finite() || decay_rate < 0.0 {
            return Err(ConfigurationError::InvalidDecayRate(decay_rate));
        }
        if !noise_floor.is_finite() || noise_floor < 0.0 {
            return Err(ConfigurationError::InvalidNoiseFloor(noise_floor));
        }
        let buffer = DecayBuffer::with_capacity(capacity)?;

        debug!(
            decay_rate,
            noise_floor,
            capacity,
            "Tension decay engine constructed"
        );

        Ok(Self {
            decay_rate,
            noise_floor,
            buffer,
            damping: DampingCache::new(),
            processed: C::default(),
            skipped: C::default(),
            snapped: C::default(),
        })
    }

    /// Decay every valid component in place and return the rolling average
    /// tension.
    pub fn decay(&mut self, components: &mut [ComponentReading], delta_time: f64) -> f64 {
        if !(delta_time > 0.0 && delta_time.is_finite()) {
            trace!(delta_time, "Decay: invalid tick interval, no-op");
            return self.average_tension();
        }

        let decay_factor = (-self.decay_rate * delta_time).exp();

        for lane in components.chunks_mut(BATCH_LANES) {
            for reading in lane {
                match reading {
                    ComponentReading::Reading(component) if component.is_well_formed() => {
                        let tension = self.decay_component(component, decay_factor);
                        self.buffer.push(tension);
                        self.processed.increment();
                    }
                    _ => self.skipped.increment(),
                }
            }
        }

        let average = self.average_tension();

        trace!(
            batch = components.len(),
            decay_factor = format!("{:.4}", decay_factor),
            average = format!("{:.4}", average),
            samples = self.buffer.len(),
            "Decay tick applied"
        );

        average
    }

    #[inline]
    fn decay_component(&mut self, component: &mut Component, decay_factor: f64) -> f64 {
        if component.tension < self.noise_floor {
            component.tension = 0.0;
            self.snapped.increment();
        } else {
            let damping = self.damping.damping(component.stability);
            component.tension = (component.tension * decay_factor * damping).max(0.0);
        }
        component.tension
    }

    /// Rolling average over the ring, `0.0` when empty.
    pub fn average_tension(&self) -> f64 {
        self.buffer.average()
    }

    /// Clear the ring. The damping cache and instrumentation survive.
    pub fn reset(&mut self) {
        self.buffer.clear();
        debug!("Tension decay engine reset");
    }

    pub fn stats(&self) -> DecayStats {
        DecayStats {
            processed: self.processed.get(),
            skipped: self.skipped.get(),
            snapped: self.snapped.get(),
        }
    }

    pub fn buffer(&self) -> &DecayBuffer {
        &self.buffer
    }

    pub fn damping_cache(&self) -> &DampingCache {
        &self.damping
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }
}
