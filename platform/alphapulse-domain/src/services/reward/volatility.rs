use crate::entities::returns_window::ReturnsWindow;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;
pub const DEFAULT_VOLATILITY_MIN_SAMPLES: usize = 10;
pub const DEFAULT_VOLATILITY_COEFFICIENT: f64 = 0.5;

/// `coefficient * population_std(window)` once the window holds strictly more
/// than `min_samples` returns, zero before that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPenalty {
    pub coefficient: f64,
    pub window: usize,
    pub min_samples: usize,
}

impl Default for VolatilityPenalty {
    fn default() -> Self {
        Self {
            coefficient: DEFAULT_VOLATILITY_COEFFICIENT,
            window: DEFAULT_VOLATILITY_WINDOW,
            min_samples: DEFAULT_VOLATILITY_MIN_SAMPLES,
        }
    }
}

impl VolatilityPenalty {
    pub fn penalty(&self, returns: &ReturnsWindow) -> f64 {
        if returns.len() <= self.min_samples {
            return 0.0;
        }
        self.coefficient * returns.population_std()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.coefficient.is_finite() || self.coefficient < 0.0 {
            return Err("volatility coefficient must be finite and >= 0".to_string());
        }
        if self.window == 0 {
            return Err("volatility window must be > 0".to_string());
        }
        if self.min_samples >= self.window {
            return Err(format!(
                "volatility min_samples ({}) must be below the window size ({})",
                self.min_samples, self.window
            ));
        }
        Ok(())
    }
}
