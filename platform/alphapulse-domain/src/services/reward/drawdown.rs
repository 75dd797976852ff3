use serde::{Deserialize, Serialize};

pub const DEFAULT_DRAWDOWN_COEFFICIENT: f64 = 2.0;
pub const PEAK_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPenalty {
    pub coefficient: f64,
}

impl Default for DrawdownPenalty {
    fn default() -> Self {
        Self {
            coefficient: DEFAULT_DRAWDOWN_COEFFICIENT,
        }
    }
}

impl DrawdownPenalty {
    pub fn penalty(&self, equity: f64, peak_equity: f64) -> f64 {
        self.coefficient * relative_drawdown(equity, peak_equity)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.coefficient.is_finite() || self.coefficient < 0.0 {
            return Err("drawdown coefficient must be finite and >= 0".to_string());
        }
        Ok(())
    }
}

/// `(peak - equity) / peak`, zero when equity is at or above the peak.
pub fn relative_drawdown(equity: f64, peak_equity: f64) -> f64 {
    if equity >= peak_equity {
        return 0.0;
    }
    (peak_equity - equity) / peak_equity.max(PEAK_EPSILON)
}
