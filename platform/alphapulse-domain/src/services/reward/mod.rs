pub mod cost;
pub mod drawdown;
pub mod pnl;
pub mod volatility;

use crate::entities::episode_state::{EpisodeSnapshot, EpisodeState};
use crate::errors::EnvError;
use crate::services::engine::executor::ExecutionReport;
use cost::CostModel;
use drawdown::DrawdownPenalty;
use pnl::PnlSource;
use serde::{Deserialize, Serialize};
use volatility::VolatilityPenalty;

pub const DEFAULT_SPREAD_RATE: f64 = 0.0005;
pub const LEGACY_FEE_RATE: f64 = 0.0001;
pub const LEGACY_CLOSE_SLIPPAGE_RATE: f64 = 0.00005;

/// Everything a reward function may look at for one transition.
#[derive(Debug, Clone, Copy)]
pub struct RewardInput<'a> {
    pub before: &'a EpisodeSnapshot,
    pub after: &'a EpisodeState,
    pub report: &'a ExecutionReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub pnl: f64,
    pub cost: f64,
    pub volatility_penalty: f64,
    pub drawdown_penalty: f64,
    pub reward: f64,
}

pub trait RewardFunction {
    fn evaluate(&self, input: &RewardInput<'_>) -> RewardBreakdown;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardPreset {
    /// Equity delta minus volatility and drawdown penalties; costs live in
    /// the balance.
    RiskAdjusted,
    /// Mark against entry price, minus a price-fraction fee and a close
    /// penalty, minus volatility and drawdown penalties.
    MarkToEntry,
    /// Equity delta minus a spread fraction of traded notional, with lighter
    /// drawdown weighting and an earlier volatility penalty.
    SpreadCost,
}

impl RewardPreset {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "risk_adjusted" | "canonical" => Ok(RewardPreset::RiskAdjusted),
            "mark_to_entry" | "legacy" => Ok(RewardPreset::MarkToEntry),
            "spread_cost" => Ok(RewardPreset::SpreadCost),
            _ => Err(format!(
                "unsupported reward preset: {value} (expected risk_adjusted | mark_to_entry | spread_cost)"
            )),
        }
    }
}

/// Composition of the four independent reward modules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub pnl: PnlSource,
    pub cost: CostModel,
    pub volatility: VolatilityPenalty,
    pub drawdown: DrawdownPenalty,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::preset(RewardPreset::RiskAdjusted)
    }
}

impl RewardConfig {
    pub fn preset(preset: RewardPreset) -> Self {
        match preset {
            RewardPreset::RiskAdjusted => Self {
                pnl: PnlSource::EquityDelta,
                cost: CostModel::InBalance,
                volatility: VolatilityPenalty::default(),
                drawdown: DrawdownPenalty::default(),
            },
            RewardPreset::MarkToEntry => Self {
                pnl: PnlSource::MarkToEntry,
                cost: CostModel::FeeFraction {
                    fee_rate: LEGACY_FEE_RATE,
                    close_slippage_rate: LEGACY_CLOSE_SLIPPAGE_RATE,
                },
                volatility: VolatilityPenalty::default(),
                drawdown: DrawdownPenalty::default(),
            },
            RewardPreset::SpreadCost => Self {
                pnl: PnlSource::EquityDelta,
                cost: CostModel::SpreadFraction {
                    spread_rate: DEFAULT_SPREAD_RATE,
                },
                volatility: VolatilityPenalty {
                    coefficient: 1.0,
                    window: volatility::DEFAULT_VOLATILITY_WINDOW,
                    min_samples: 5,
                },
                drawdown: DrawdownPenalty { coefficient: 1.0 },
            },
        }
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        self.cost
            .validate()
            .and_then(|_| self.volatility.validate())
            .and_then(|_| self.drawdown.validate())
            .map_err(EnvError::InvalidConfig)
    }
}

impl RewardFunction for RewardConfig {
    fn evaluate(&self, input: &RewardInput<'_>) -> RewardBreakdown {
        let pnl = self.pnl.step_pnl(input.before, input.after, input.report);
        let cost = self.cost.charge(input.report);
        let volatility_penalty = self.volatility.penalty(&input.after.returns);
        let drawdown_penalty = self
            .drawdown
            .penalty(input.after.equity, input.after.peak_equity);

        RewardBreakdown {
            pnl,
            cost,
            volatility_penalty,
            drawdown_penalty,
            reward: pnl - cost - volatility_penalty - drawdown_penalty,
        }
    }
}
