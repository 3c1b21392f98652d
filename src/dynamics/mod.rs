// =============================================================================
// Dynamics Module
// =============================================================================
//
// Aggregate tension as a first-order ODE driven by market shock and
// liquidity, independent of per-component decay.

pub mod forcing;
pub mod model;

pub use forcing::{ForcingScales, ForcingTerms, MarketForcing};
pub use model::{DynamicalState, DynamicalTensionModel, DEFAULT_ALPHA, DEFAULT_BETA, MAX_DT};
