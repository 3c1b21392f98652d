// =============================================================================
// Tension Module
// =============================================================================
//
// Per-component tension decay:
// - DecayBuffer (power-of-two ring of recent tension samples)
// - DampingCache (exp(-stability) memo over 101 quantized keys)
// - TensionDecayEngine (decay + damping + noise-floor cutoff per tick)

pub mod damping;
pub mod decay_buffer;
pub mod engine;

pub use damping::{stability_key, DampingCache, DAMPING_KEYS};
pub use decay_buffer::DecayBuffer;
pub use engine::{DecayStats, TensionDecayEngine, NOISE_FLOOR};
