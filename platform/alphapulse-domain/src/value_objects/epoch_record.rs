use serde::{Deserialize, Serialize};

/// Per-epoch training statistics as stored in the growth log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: u64,
    pub sharpe_ratio: f64,
    pub mdd: f64,
    pub reward: f64,
}

impl EpochRecord {
    pub fn rounded(epoch: u64, sharpe_ratio: f64, mdd: f64, reward: f64) -> Self {
        Self {
            epoch,
            sharpe_ratio: round_to(sharpe_ratio, 4),
            mdd: round_to(mdd, 4),
            reward: round_to(reward, 2),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
