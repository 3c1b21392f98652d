// =============================================================================
// Tension Engine — decay, persistence, dynamics and signal fusion
// =============================================================================
//
// Synchronous, allocation-bounded engines meant to be driven once per tick:
//
//   tension   — per-component exponential decay into a rolling ring buffer
//   regime    — rescaled-range Hurst exponent over a bounded window
//   dynamics  — Euler-integrated aggregate tension from shock / liquidity
//   signals   — per-symbol fusion of four weak indicators into a category
//   monitor   — lock-wrapped owner of all engines for a shared tick task
// =============================================================================

pub mod dynamics;
pub mod error;
pub mod instrumentation;
pub mod monitor;
pub mod regime;
pub mod runtime_config;
pub mod signals;
pub mod tension;
pub mod types;

pub use dynamics::{DynamicalTensionModel, MarketForcing};
pub use error::{ConfigResult, ConfigurationError};
pub use monitor::{MonitorSnapshot, TensionMonitor, TickFrame};
pub use regime::{HurstAnalyzer, HurstReading};
pub use runtime_config::EngineConfig;
pub use signals::{FusedSignal, SignalComponents, SignalFusionEngine};
pub use tension::{DecayBuffer, TensionDecayEngine};
pub use types::{
    Component, ComponentReading, HurstInterpretation, RawComponent, SignalCategory,
    TickerSnapshot,
};
