// =============================================================================
// Tension Monitor — tick-facing owner of every engine
// =============================================================================
//
// The engines themselves are single-writer and lock-free. The monitor wraps
// each one in a parking_lot::Mutex so a periodic tick task and any number of
// readers can share one `Arc<TensionMonitor>`.
//
// Data flow per tick:
//   components -> TensionDecayEngine -> rolling average -> aggregate Hurst
//   tickers    -> SignalFusionEngine (per symbol)
//   tickers    -> mean forcing -> DynamicalTensionModel
//
// A monotonically increasing version counter is bumped on every mutation so
// consumers can detect fresh data cheaply.
// =============================================================================

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dynamics::{DynamicalState, DynamicalTensionModel, MarketForcing};
use crate::error::ConfigResult;
use crate::regime::{HurstAnalyzer, HurstReading};
use crate::runtime_config::EngineConfig;
use crate::signals::{FusedSignal, SignalFusionEngine};
use crate::tension::{DecayStats, TensionDecayEngine};
use crate::types::{ComponentReading, RawComponent, TickerSnapshot};

// =============================================================================
// Input frame
// =============================================================================

/// Everything the data source delivers for one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickFrame {
    /// Elapsed time since the previous frame.
    #[serde(default)]
    pub dt: f64,

    #[serde(default)]
    pub components: Vec<RawComponent>,

    #[serde(default)]
    pub tickers: BTreeMap<String, TickerSnapshot>,
}

// =============================================================================
// Output snapshot
// =============================================================================

/// Serializable view of all engine outputs for the consumer.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub state_version: u64,
    pub server_time: i64,
    pub generated_at: String,

    // ── Per-component decay ─────────────────────────────────────────────
    pub average_tension: f64,
    pub buffered_samples: usize,
    pub decay_stats: DecayStats,

    // ── Aggregate persistence ───────────────────────────────────────────
    pub hurst: HurstReading,

    // ── Dynamical model ─────────────────────────────────────────────────
    pub dynamics: DynamicalState,
    pub forcing: Option<MarketForcing>,
    /// `(alpha / beta) * shock` for the last forcing, if any.
    pub equilibrium: Option<f64>,

    // ── Fusion ──────────────────────────────────────────────────────────
    pub signals: BTreeMap<String, FusedSignal>,
}

// =============================================================================
// TensionMonitor
// =============================================================================

pub struct TensionMonitor {
    state_version: AtomicU64,

    decay: Mutex<TensionDecayEngine>,
    hurst: Mutex<HurstAnalyzer>,
    dynamics: Mutex<DynamicalTensionModel>,
    fusion: Mutex<SignalFusionEngine>,

    last_forcing: RwLock<Option<MarketForcing>>,
    /// Empty means every symbol is tracked.
    tracked: HashSet<String>,
}

impl TensionMonitor {
    /// Build every engine from `config`. Fails on the first invalid section.
    pub fn new(config: &EngineConfig) -> ConfigResult<Self> {
        let monitor = Self {
            state_version: AtomicU64::new(1),
            decay: Mutex::new(TensionDecayEngine::from_config(&config.decay)?),
            hurst: Mutex::new(HurstAnalyzer::from_config(&config.hurst)?),
            dynamics: Mutex::new(DynamicalTensionModel::from_config(&config.dynamics)?),
            fusion: Mutex::new(SignalFusionEngine::new(&config.fusion)?),
            last_forcing: RwLock::new(None),
            tracked: config.symbols.iter().cloned().collect(),
        };

        debug!(
            tracked = monitor.tracked.len(),
            capacity = config.decay.buffer_capacity,
            "Tension monitor constructed"
        );
        Ok(monitor)
    }

    // ── Version Management ──────────────────────────────────────────────

    fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Ingestion ───────────────────────────────────────────────────────

    /// Decay a batch of components and feed the rolling average into the
    /// aggregate Hurst analyzer when at least one component was updated.
    pub fn ingest_components(&self, components: &mut [ComponentReading], dt: f64) -> f64 {
        let (average, updated) = {
            let mut decay = self.decay.lock();
            let before = decay.stats().processed;
            let average = decay.decay(components, dt);
            (average, decay.stats().processed > before)
        };

        if updated {
            self.hurst.lock().update(average);
            self.increment_version();
        }
        average
    }

    /// Fuse every tracked ticker and advance the dynamical model by one step
    /// using the mean forcing across them.
    pub fn ingest_tickers<'a, I>(&self, tickers: I, dt: f64) -> BTreeMap<String, FusedSignal>
    where
        I: IntoIterator<Item = (&'a str, &'a TickerSnapshot)>,
    {
        let accepted: Vec<(&str, &TickerSnapshot)> = tickers
            .into_iter()
            .filter(|(symbol, _)| self.is_tracked(symbol))
            .collect();

        if accepted.is_empty() {
            trace!("Monitor: no tracked tickers in frame");
            return BTreeMap::new();
        }

        let fused: BTreeMap<String, FusedSignal> = {
            let mut fusion = self.fusion.lock();
            accepted
                .iter()
                .map(|(symbol, snapshot)| (symbol.to_string(), fusion.fuse(symbol, snapshot)))
                .collect()
        };

        let mut dynamics = self.dynamics.lock();
        if let Some(forcing) =
            MarketForcing::mean(accepted.iter().map(|(_, t)| *t), dynamics.scales())
        {
            dynamics.step(forcing.shock, forcing.liquidity, dt);
            *self.last_forcing.write() = Some(forcing);
        }
        drop(dynamics);

        self.increment_version();
        fused
    }

    /// Apply one complete frame.
    pub fn tick(&self, frame: &TickFrame) -> f64 {
        let mut readings: Vec<ComponentReading> =
            frame.components.iter().copied().map(ComponentReading::from).collect();
        let average = self.ingest_components(&mut readings, frame.dt);
        self.ingest_tickers(frame.tickers.iter().map(|(s, t)| (s.as_str(), t)), frame.dt);
        average
    }

    fn is_tracked(&self, symbol: &str) -> bool {
        self.tracked.is_empty() || self.tracked.contains(symbol)
    }

    // ── Maintenance ─────────────────────────────────────────────────────

    /// Clear every engine's history. Construction parameters are kept.
    pub fn reset(&self) {
        self.decay.lock().reset();
        self.hurst.lock().reset();
        self.dynamics.lock().reset();
        self.fusion.lock().reset();
        *self.last_forcing.write() = None;
        self.increment_version();
        debug!("Tension monitor reset");
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    pub fn average_tension(&self) -> f64 {
        self.decay.lock().average_tension()
    }

    pub fn hurst(&self) -> HurstReading {
        self.hurst.lock().current()
    }

    pub fn last_signal(&self, symbol: &str) -> Option<FusedSignal> {
        self.fusion.lock().last_signal(symbol).cloned()
    }

    /// Build a complete, serialisable snapshot of every engine's outputs.
    pub fn build_snapshot(&self) -> MonitorSnapshot {
        let now = Utc::now();

        let (average_tension, buffered_samples, decay_stats) = {
            let decay = self.decay.lock();
            (decay.average_tension(), decay.buffer().len(), decay.stats())
        };

        let forcing = *self.last_forcing.read();
        let (dynamics, equilibrium) = {
            let model = self.dynamics.lock();
            (model.state(), forcing.map(|f| model.equilibrium(f.shock)))
        };

        let signals = self
            .fusion
            .lock()
            .latest()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        MonitorSnapshot {
            state_version: self.current_state_version(),
            server_time: now.timestamp_millis(),
            generated_at: now.to_rfc3339(),
            average_tension,
            buffered_samples,
            decay_stats,
            hurst: self.hurst(),
            dynamics,
            forcing,
            equilibrium,
            signals,
        }
    }
}
