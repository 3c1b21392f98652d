// =============================================================================
// Dynamical Tension Model — explicit Euler integration of aggregate tension
// =============================================================================
//
//   dT/dt = alpha * shock - beta * liquidity
//   T_new = clamp(T_old + dT/dt * dt, 0, 1)
//
// `dt` is capped per call so a jittery tick cannot destabilise the explicit
// Euler step. The steady state under constant shock is reported separately
// as `(alpha / beta) * shock` and never fed back into the state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dynamics::forcing::{ForcingScales, MarketForcing};
use crate::error::{ConfigResult, ConfigurationError};
use crate::runtime_config::DynamicsConfig;
use crate::types::TickerSnapshot;

pub const DEFAULT_ALPHA: f64 = 0.8;
pub const DEFAULT_BETA: f64 = 0.6;

/// Largest integration step accepted per call, in time units.
pub const MAX_DT: f64 = 0.2;

/// Serializable view of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicalState {
    pub alpha: f64,
    pub beta: f64,
    pub current_tension: f64,
    /// Time of the last applied step, or of the first `advance` call.
    pub last_update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct DynamicalTensionModel {
    alpha: f64,
    beta: f64,
    max_dt: f64,
    scales: ForcingScales,
    current_tension: f64,
    last_update_time: Option<DateTime<Utc>>,
}

impl DynamicalTensionModel {
    pub fn new(alpha: f64, beta: f64) -> ConfigResult<Self> {
        Self::with_limits(alpha, beta, MAX_DT, ForcingScales::default())
    }

    pub fn from_config(config: &DynamicsConfig) -> ConfigResult<Self> {
        Self::with_limits(config.alpha, config.beta, config.max_dt, config.scales)
    }

    pub fn with_limits(
        alpha: f64,
        beta: f64,
        max_dt: f64,
        scales: ForcingScales,
    ) -> ConfigResult<Self> {
        positive("alpha", alpha)?;
        positive("beta", beta)?;
        positive("max_dt", max_dt)?;
        positive("volatility_scale", scales.volatility_scale)?;
        positive("activity_volume", scales.activity_volume)?;
        positive("depth_volume", scales.depth_volume)?;

        debug!(alpha, beta, max_dt, "Dynamical tension model constructed");

        Ok(Self {
            alpha,
            beta,
            max_dt,
            scales,
            current_tension: 0.0,
            last_update_time: None,
        })
    }

    /// Advance the state by one Euler step of at most `max_dt`.
    ///
    /// Non-positive or non-finite `dt`, and non-finite forcing, leave the state
    /// untouched.
    pub fn step(&mut self, market_shock: f64, liquidity: f64, dt: f64) -> f64 {
        if self.integrate(market_shock, liquidity, dt) {
            self.last_update_time = Some(Utc::now());
        }
        self.current_tension
    }

    /// Step with forcing derived from a ticker.
    pub fn step_ticker(&mut self, ticker: &TickerSnapshot, dt: f64) -> f64 {
        let forcing = MarketForcing::from_ticker(ticker, &self.scales);
        self.step(forcing.shock, forcing.liquidity, dt)
    }

    /// Step with `dt` taken as the seconds elapsed since the previous update.
    ///
    /// The first call only records `now`. A timestamp earlier than the last
    /// update is ignored.
    pub fn advance(&mut self, market_shock: f64, liquidity: f64, now: DateTime<Utc>) -> f64 {
        match self.last_update_time {
            Some(prev) if now < prev => {
                trace!(%now, %prev, "Dynamics: clock went backwards, ignoring");
            }
            Some(prev) => {
                let dt = (now - prev).num_milliseconds() as f64 / 1000.0;
                if self.integrate(market_shock, liquidity, dt) {
                    self.last_update_time = Some(now);
                }
            }
            None => self.last_update_time = Some(now),
        }
        self.current_tension
    }

    /// Apply one Euler step. Returns `false` when the inputs made it a no-op.
    fn integrate(&mut self, market_shock: f64, liquidity: f64, dt: f64) -> bool {
        if !(dt > 0.0 && dt.is_finite()) || !market_shock.is_finite() || !liquidity.is_finite() {
            trace!(dt, market_shock, liquidity, "Dynamics: degenerate step, no-op");
            return false;
        }

        let dt = dt.min(self.max_dt);
        let derivative = self.alpha * market_shock - self.beta * liquidity;
        let next = self.current_tension + derivative * dt;

        if next.is_nan() {
            return false;
        }
        self.current_tension = next.clamp(0.0, 1.0);

        trace!(
            shock = format!("{:.4}", market_shock),
            liquidity = format!("{:.4}", liquidity),
            derivative = format!("{:.4}", derivative),
            tension = format!("{:.4}", self.current_tension),
            "Dynamics: Euler step"
        );
        true
    }

    /// Steady-state tension under a constant shock with zero liquidity
    /// offset, `(alpha / beta) * shock`.
    pub fn equilibrium(&self, market_shock: f64) -> f64 {
        (self.alpha / self.beta) * market_shock
    }

    pub fn current_tension(&self) -> f64 {
        self.current_tension
    }

    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        self.last_update_time
    }

    pub fn scales(&self) -> &ForcingScales {
        &self.scales
    }

    pub fn state(&self) -> DynamicalState {
        DynamicalState {
            alpha: self.alpha,
            beta: self.beta,
            current_tension: self.current_tension,
            last_update_time: self.last_update_time,
        }
    }

    pub fn reset(&mut self) {
        self.current_tension = 0.0;
        self.last_update_time = None;
    }
}

impl Default for DynamicalTensionModel {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            max_dt: MAX_DT,
            scales: ForcingScales::default(),
            current_tension: 0.0,
            last_update_time: None,
        }
    }
}

fn positive(name: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidCoefficient { name, value })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_euler_step() {
        let mut m = DynamicalTensionModel::default();
        // 0.8 * 1.0 - 0.6 * 0.5 = 0.5 per unit time.
        let t = m.step(1.0, 0.5, 0.1);
        assert!((t - 0.05).abs() < 1e-12);
        assert!(m.last_update_time().is_some());
    }

    #[test]
    fn test_dt_capped() {
        let mut capped = DynamicalTensionModel::default();
        let mut exact = DynamicalTensionModel::default();
        capped.step(1.0, 0.0, 10.0);
        exact.step(1.0, 0.0, MAX_DT);
        assert_eq!(capped.current_tension(), exact.current_tension());
        assert!((capped.current_tension() - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_output_clamped_under_extreme_inputs() {
        let mut m = DynamicalTensionModel::default();
        for (shock, liq) in [(1e300, 0.0), (0.0, 1e300), (-1e9, 1e9), (1e9, -1e9), (5.0, 5.0)] {
            for _ in 0..20 {
                let t = m.step(shock, liq, 0.2);
                assert!((0.0..=1.0).contains(&t), "tension {t} escaped [0, 1]");
            }
        }
    }

    #[test]
    fn test_degenerate_step_is_noop() {
        let mut m = DynamicalTensionModel::default();
        m.step(1.0, 0.0, 0.2);
        let before = m.current_tension();
        assert_eq!(m.step(1.0, 0.0, 0.0), before);
        assert_eq!(m.step(1.0, 0.0, -0.5), before);
        assert_eq!(m.step(f64::NAN, 0.0, 0.1), before);
        assert_eq!(m.step(1.0, f64::INFINITY, 0.1), before);
    }

    #[test]
    fn test_degenerate_step_keeps_last_update_time() {
        let mut m = DynamicalTensionModel::default();
        m.step(1.0, 0.0, 0.0);
        m.step(f64::NAN, 0.0, 0.1);
        assert!(m.last_update_time().is_none());

        m.step(1.0, 0.0, 0.1);
        let stamped = m.last_update_time();
        assert!(stamped.is_some());
        m.step(1.0, 0.0, f64::INFINITY);
        assert_eq!(m.last_update_time(), stamped);

        let t0 = Utc::now();
        let mut a = DynamicalTensionModel::default();
        a.advance(1.0, 0.0, t0);
        a.advance(f64::NAN, 0.0, t0 + Duration::milliseconds(50));
        assert_eq!(a.last_update_time(), Some(t0));
    }

    #[test]
    fn test_equilibrium_reference() {
        let m = DynamicalTensionModel::default();
        assert!((m.equilibrium(0.6) - 0.8).abs() < 1e-12);
        assert_eq!(m.equilibrium(0.0), 0.0);
        assert_eq!(m.current_tension(), 0.0);
    }

    #[test]
    fn test_invalid_coefficients_rejected() {
        assert!(DynamicalTensionModel::new(0.8, 0.0).is_err());
        assert!(DynamicalTensionModel::new(-1.0, 0.6).is_err());
        assert!(DynamicalTensionModel::new(f64::NAN, 0.6).is_err());
        assert!(DynamicalTensionModel::new(DEFAULT_ALPHA, DEFAULT_BETA).is_ok());
    }

    #[test]
    fn test_advance_uses_elapsed_time() {
        let mut m = DynamicalTensionModel::default();
        let t0 = Utc::now();
        assert_eq!(m.advance(1.0, 0.0, t0), 0.0);
        let t = m.advance(1.0, 0.0, t0 + Duration::milliseconds(100));
        assert!((t - 0.08).abs() < 1e-12);
        // Backwards clock is ignored.
        assert_eq!(m.advance(1.0, 0.0, t0), t);
        assert_eq!(m.last_update_time(), Some(t0 + Duration::milliseconds(100)));
    }

    #[test]
    fn test_step_ticker_and_reset() {
        let mut m = DynamicalTensionModel::default();
        let volatile = TickerSnapshot::new(100.0, 110.0, 90.0, 2_000_000.0);
        let t = m.step_ticker(&volatile, 0.2);
        assert!(t > 0.0);
        m.reset();
        assert_eq!(m.current_tension(), 0.0);
        assert!(m.last_update_time().is_none());
    }
}
