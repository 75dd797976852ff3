use crate::errors::EnvError;

pub const DEFAULT_SLIPPAGE_STD_FRACTION: f64 = 0.0002;
pub const DEFAULT_FEE_RATE: f64 = 0.0001;

/// Unit-size fill simulation parameters.
///
/// `slippage_std_fraction` is the standard deviation of the zero-mean Gaussian
/// draw, expressed as a fraction of the reference price. Fees are
/// `fee_fixed + fee_rate * notional` per executed trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    pub slippage_std_fraction: f64,
    pub fee_rate: f64,
    pub fee_fixed: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            slippage_std_fraction: DEFAULT_SLIPPAGE_STD_FRACTION,
            fee_rate: DEFAULT_FEE_RATE,
            fee_fixed: 0.0,
        }
    }
}

impl ExecutionConfig {
    pub fn frictionless() -> Self {
        Self {
            slippage_std_fraction: 0.0,
            fee_rate: 0.0,
            fee_fixed: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        let fields = [
            ("slippage_std_fraction", self.slippage_std_fraction),
            ("fee_rate", self.fee_rate),
            ("fee_fixed", self.fee_fixed),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EnvError::InvalidConfig(format!(
                    "execution.{name} must be finite and >= 0 (got {value})"
                )));
            }
        }
        Ok(())
    }

    pub fn fee_for(&self, notional: f64) -> f64 {
        self.fee_fixed + self.fee_rate * notional.abs()
    }
}
