use crate::entities::returns_window::ReturnsWindow;
use serde::Serialize;

/// Mutable bookkeeping for one episode.
///
/// `position` is a signed unit count: positive long, negative short, zero flat.
/// `entry_price` is the execution price of the fill that took the position out
/// of flat. It is not a weighted-average cost basis: adding to an open position
/// leaves it untouched, and it resets to zero once the position is flat again.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeState {
    pub balance: f64,
    pub position: i64,
    pub entry_price: f64,
    pub equity: f64,
    pub peak_equity: f64,
    pub returns: ReturnsWindow,
    pub step_index: usize,
}

impl EpisodeState {
    pub fn new(initial_balance: f64, returns_window: usize) -> Self {
        Self {
            balance: initial_balance,
            position: 0,
            entry_price: 0.0,
            equity: initial_balance,
            peak_equity: initial_balance,
            returns: ReturnsWindow::new(returns_window),
            step_index: 0,
        }
    }

    pub fn reset(&mut self, initial_balance: f64) {
        self.balance = initial_balance;
        self.position = 0;
        self.entry_price = 0.0;
        self.equity = initial_balance;
        self.peak_equity = initial_balance;
        self.returns.clear();
        self.step_index = 0;
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    /// Marks the position at `price` and raises the peak if needed.
    pub fn mark_to_market(&mut self, price: f64) {
        self.equity = self.balance + self.position as f64 * price;
        if self.equity > self.peak_equity {
            self.peak_equity = self.equity;
        }
    }

    pub fn drawdown(&self) -> f64 {
        if self.equity >= self.peak_equity {
            return 0.0;
        }
        (self.peak_equity - self.equity) / self.peak_equity.max(f64::EPSILON)
    }

    pub fn snapshot(&self) -> EpisodeSnapshot {
        EpisodeSnapshot {
            balance: self.balance,
            position: self.position,
            entry_price: self.entry_price,
            equity: self.equity,
            peak_equity: self.peak_equity,
            step_index: self.step_index,
        }
    }
}

/// Copyable view of the scalar part of [`EpisodeState`], used as the
/// pre-step reference by the reward modules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeSnapshot {
    pub balance: f64,
    pub position: i64,
    pub entry_price: f64,
    pub equity: f64,
    pub peak_equity: f64,
    pub step_index: usize,
}
