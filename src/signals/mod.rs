// =============================================================================
// Signals Module
// =============================================================================
//
// Per-symbol signal fusion:
// - Volume profile (bounded volume history feeding a Hurst estimate)
// - Weighted scoring of the four component signals
// - Fusion engine producing the categorical signal

pub mod fusion;
pub mod volume_profile;
pub mod weighted_score;

pub use fusion::{FusedSignal, SignalComponents, SignalFusionEngine};
pub use volume_profile::VolumeProfile;
pub use weighted_score::{
    ComponentSignals, FusionWeights, ScoringResult, SignalContribution, WeightedScorer,
};
