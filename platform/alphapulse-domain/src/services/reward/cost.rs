use crate::services::engine::executor::ExecutionReport;
use crate::value_objects::action::Action;
use serde::{Deserialize, Serialize};

/// How a reward accounts for transaction costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostModel {
    /// Costs already sit in the balance through the execution price and fee,
    /// so the reward subtracts nothing further.
    InBalance,
    /// `fee_rate * price` for any non-Hold action plus
    /// `close_slippage_rate * price` for CloseAll, on the reference price.
    FeeFraction {
        fee_rate: f64,
        close_slippage_rate: f64,
    },
    /// `spread_rate * notional` for each executed trade.
    SpreadFraction { spread_rate: f64 },
}

impl CostModel {
    pub fn charge(&self, report: &ExecutionReport) -> f64 {
        match *self {
            CostModel::InBalance => 0.0,
            CostModel::FeeFraction {
                fee_rate,
                close_slippage_rate,
            } => {
                if report.action.is_hold() {
                    return 0.0;
                }
                let mut cost = fee_rate * report.reference_price;
                if report.action == Action::CloseAll {
                    cost += close_slippage_rate * report.reference_price;
                }
                cost
            }
            CostModel::SpreadFraction { spread_rate } => {
                if !report.traded() {
                    return 0.0;
                }
                spread_rate * report.execution_price * report.quantity.unsigned_abs() as f64
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let rates = match *self {
            CostModel::InBalance => vec![],
            CostModel::FeeFraction {
                fee_rate,
                close_slippage_rate,
            } => vec![fee_rate, close_slippage_rate],
            CostModel::SpreadFraction { spread_rate } => vec![spread_rate],
        };
        if rates.iter().all(|r| r.is_finite() && *r >= 0.0) {
            Ok(())
        } else {
            Err("reward cost rates must be finite and >= 0".to_string())
        }
    }
}
