use crate::entities::episode_state::EpisodeState;
use crate::services::engine::execution::ExecutionConfig;
use crate::services::engine::slippage::GaussianSlippage;
use crate::value_objects::action::Action;
use serde::Serialize;

/// Floor applied to the magnitude of the pre-step equity when turning a PnL
/// into a return.
pub const RETURN_EPSILON: f64 = 1e-9;

/// What one `execute` call did to the episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub action: Action,
    /// Signed units traded (+ bought, - sold). Zero for Hold and flat CloseAll.
    pub quantity: i64,
    pub reference_price: f64,
    pub execution_price: f64,
    pub fee: f64,
    /// Adverse price difference times units; already inside the balance.
    pub slippage_cost: f64,
    pub equity_before: f64,
    pub equity_after: f64,
    pub step_return: f64,
}

impl ExecutionReport {
    pub fn traded(&self) -> bool {
        self.quantity != 0
    }

    pub fn pnl(&self) -> f64 {
        self.equity_after - self.equity_before
    }

    pub fn transaction_cost(&self) -> f64 {
        self.fee + self.slippage_cost
    }
}

/// Applies actions to an [`EpisodeState`]; the only writer of that state
/// besides `reset`.
#[derive(Debug, Clone)]
pub struct StepExecutor {
    config: ExecutionConfig,
    slippage: GaussianSlippage,
}

impl StepExecutor {
    pub fn new(config: ExecutionConfig, seed: Option<u64>) -> Self {
        Self {
            slippage: GaussianSlippage::new(config.slippage_std_fraction, seed),
            config,
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn reseed(&mut self, seed: u64) {
        self.slippage.reseed(seed);
    }

    /// Simulates the fill at `reference_price`, updates balance, position and
    /// entry price, marks equity on the reference price, records the step's
    /// return in the trailing window and advances `step_index` by one.
    pub fn execute(
        &mut self,
        state: &mut EpisodeState,
        action: Action,
        reference_price: f64,
    ) -> ExecutionReport {
        let equity_before = state.equity;

        let draw = if action.is_hold() {
            0.0
        } else {
            self.slippage.draw_fraction()
        };
        let inflated = reference_price * (1.0 + draw);
        let deflated = reference_price * (1.0 - draw);

        let (quantity, execution_price) = match action {
            Action::Hold => (0, reference_price),
            Action::Buy => (1, inflated),
            Action::Sell => (-1, deflated),
            Action::CloseAll if state.position > 0 => (-state.position, deflated),
            Action::CloseAll if state.position < 0 => (-state.position, inflated),
            Action::CloseAll => (0, reference_price),
        };

        let mut fee = 0.0;
        let mut slippage_cost = 0.0;
        if quantity != 0 {
            let notional = execution_price * quantity as f64;
            fee = self.config.fee_for(notional);
            slippage_cost = (execution_price - reference_price).abs() * quantity.unsigned_abs() as f64;

            state.balance -= notional + fee;
            let was_flat = state.is_flat();
            state.position += quantity;
            if state.is_flat() {
                state.entry_price = 0.0;
            } else if was_flat {
                state.entry_price = execution_price;
            }
        }

        state.mark_to_market(reference_price);

        let pnl = state.equity - equity_before;
        let step_return = pnl / equity_before.abs().max(RETURN_EPSILON);
        state.returns.push(step_return);
        state.step_index += 1;

        ExecutionReport {
            action,
            quantity,
            reference_price,
            execution_price,
            fee,
            slippage_cost,
            equity_before,
            equity_after: state.equity,
            step_return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StepExecutor;
    use crate::entities::episode_state::EpisodeState;
    use crate::services::engine::execution::ExecutionConfig;
    use crate::value_objects::action::Action;

    fn frictionless() -> StepExecutor {
        StepExecutor::new(ExecutionConfig::frictionless(), Some(1))
    }

    #[test]
    fn buy_debits_balance_and_sets_entry_from_flat() {
        let mut state = EpisodeState::new(1_000.0, 20);
        let mut exec = frictionless();
        let report = exec.execute(&mut state, Action::Buy, 100.0);
        assert_eq!(state.position, 1);
        assert_eq!(state.balance, 900.0);
        assert_eq!(state.entry_price, 100.0);
        assert_eq!(state.equity, 1_000.0);
        assert_eq!(report.quantity, 1);
        assert!(report.traded());
        assert_eq!(state.step_index, 1);
    }

    #[test]
    fn adding_to_position_keeps_first_entry_price() {
        let mut state = EpisodeState::new(1_000.0, 20);
        let mut exec = frictionless();
        exec.execute(&mut state, Action::Buy, 100.0);
        exec.execute(&mut state, Action::Buy, 120.0);
        assert_eq!(state.position, 2);
        assert_eq!(state.entry_price, 100.0);
        assert_eq!(state.balance, 780.0);
    }

    #[test]
    fn sell_from_flat_opens_short() {
        let mut state = EpisodeState::new(1_000.0, 20);
        let mut exec = frictionless();
        exec.execute(&mut state, Action::Sell, 50.0);
        assert_eq!(state.position, -1);
        assert_eq!(state.balance, 1_050.0);
        assert_eq!(state.entry_price, 50.0);
        exec.execute(&mut state, Action::Hold, 40.0);
        assert_eq!(state.equity, 1_010.0);
    }

    #[test]
    fn close_all_settles_short_and_clears_entry() {
        let mut state = EpisodeState::new(1_000.0, 20);
        let mut exec = frictionless();
        exec.execute(&mut state, Action::Sell, 50.0);
        exec.execute(&mut state, Action::Sell, 60.0);
        let report = exec.execute(&mut state, Action::CloseAll, 40.0);
        assert_eq!(report.quantity, 2);
        assert_eq!(state.position, 0);
        assert_eq!(state.entry_price, 0.0);
        assert_eq!(state.balance, 1_030.0);
        assert_eq!(state.equity, 1_030.0);
    }

    #[test]
    fn close_all_when_flat_is_free() {
        let mut state = EpisodeState::new(1_000.0, 20);
        let mut exec = StepExecutor::new(ExecutionConfig::default(), Some(3));
        let report = exec.execute(&mut state, Action::CloseAll, 100.0);
        assert!(!report.traded());
        assert_eq!(report.fee, 0.0);
        assert_eq!(state.balance, 1_000.0);
    }

    #[test]
    fn fees_are_charged_into_balance() {
        let mut state = EpisodeState::new(1_000.0, 20);
        let config = ExecutionConfig {
            slippage_std_fraction: 0.0,
            fee_rate: 0.001,
            fee_fixed: 0.5,
        };
        let mut exec = StepExecutor::new(config, Some(1));
        let report = exec.execute(&mut state, Action::Buy, 100.0);
        assert!((report.fee - 0.6).abs() < 1e-12);
        assert!((state.balance - 899.4).abs() < 1e-9);
        assert!((state.equity - 999.4).abs() < 1e-9);
    }

    #[test]
    fn slippage_is_adverse_for_both_sides() {
        let config = ExecutionConfig {
            slippage_std_fraction: 0.01,
            fee_rate: 0.0,
            fee_fixed: 0.0,
        };
        let mut exec = StepExecutor::new(config, Some(99));
        let mut state = EpisodeState::new(1_000.0, 20);
        let buy = exec.execute(&mut state, Action::Buy, 100.0);
        assert!(buy.execution_price >= 100.0);
        let sell = exec.execute(&mut state, Action::Sell, 100.0);
        assert!(sell.execution_price <= 100.0);
        assert!(state.equity <= 1_000.0 + 1e-9);
    }

    #[test]
    fn hold_records_return_without_trading() {
        let mut state = EpisodeState::new(1_000.0, 20);
        let mut exec = frictionless();
        exec.execute(&mut state, Action::Buy, 100.0);
        let report = exec.execute(&mut state, Action::Hold, 110.0);
        assert_eq!(report.execution_price, 110.0);
        assert!((report.pnl() - 10.0).abs() < 1e-12);
        assert!((report.step_return - 0.01).abs() < 1e-12);
        assert_eq!(state.returns.len(), 2);
    }

    #[test]
    fn negative_equity_scales_return_by_its_magnitude() {
        let mut state = EpisodeState::new(10.0, 20);
        let mut exec = frictionless();
        exec.execute(&mut state, Action::Sell, 100.0);
        exec.execute(&mut state, Action::Hold, 200.0);
        assert_eq!(state.equity, -90.0);

        let report = exec.execute(&mut state, Action::Hold, 210.0);
        assert_eq!(report.equity_before, -90.0);
        assert!((report.pnl() + 10.0).abs() < 1e-12);
        assert!((report.step_return - (-10.0 / 90.0)).abs() < 1e-12);

        let report = exec.execute(&mut state, Action::Hold, 200.0);
        assert!((report.step_return - (10.0 / 100.0)).abs() < 1e-12);
    }

    #[test]
    fn near_zero_equity_is_floored() {
        let mut state = EpisodeState::new(100.0, 20);
        let mut exec = frictionless();
        exec.execute(&mut state, Action::Sell, 100.0);
        exec.execute(&mut state, Action::Hold, 200.0);
        assert_eq!(state.equity, 0.0);
        let report = exec.execute(&mut state, Action::Hold, 200.0);
        assert_eq!(report.step_return, 0.0);
    }
}
