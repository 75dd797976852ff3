use crate::entities::episode_state::{EpisodeSnapshot, EpisodeState};
use crate::services::engine::executor::ExecutionReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PnlSource {
    /// `equity_after - equity_before`: realized and unrealized change together,
    /// net of any cost already booked into the balance.
    EquityDelta,
    /// Unrealized mark of the open position against its entry price,
    /// `(price - entry) * |qty|` for longs and `(entry - price) * |qty|` for shorts.
    MarkToEntry,
}

impl PnlSource {
    pub fn step_pnl(
        self,
        before: &EpisodeSnapshot,
        after: &EpisodeState,
        report: &ExecutionReport,
    ) -> f64 {
        match self {
            PnlSource::EquityDelta => after.equity - before.equity,
            PnlSource::MarkToEntry => mark_to_entry(after, report.reference_price),
        }
    }
}

pub fn mark_to_entry(state: &EpisodeState, price: f64) -> f64 {
    let size = state.position.unsigned_abs() as f64;
    if state.position > 0 {
        (price - state.entry_price) * size
    } else if state.position < 0 {
        (state.entry_price - price) * size
    } else {
        0.0
    }
}
