// =============================================================================
// Error Types — Construction-time configuration failures
// =============================================================================
//
// Only engine construction can fail. Degenerate runtime input (bad tick
// interval, zero variance, zero price, malformed batch entries) never surfaces
// as an error; each engine documents its neutral fallback instead.

use thiserror::Error;

/// Rejected engine parameters. Fatal to engine creation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("decay buffer capacity {0} is not a power of two")]
    CapacityNotPowerOfTwo(usize),

    #[error("decay rate must be finite and non-negative, got {0}")]
    InvalidDecayRate(f64),

    #[error("noise floor must be finite and non-negative, got {0}")]
    InvalidNoiseFloor(f64),

    #[error("coefficient {name} must be finite and positive, got {value}")]
    InvalidCoefficient { name: &'static str, value: f64 },

    #[error("fusion weight {name} must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("{name} window must hold at least {min} samples, got {value}")]
    WindowTooSmall {
        name: &'static str,
        value: usize,
        min: usize,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;
