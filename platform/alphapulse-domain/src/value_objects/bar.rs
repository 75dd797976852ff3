use serde::{Deserialize, Serialize};

/// One OHLCV data point. `index` is the bar's position inside its feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub index: usize,
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn flat(index: usize, timestamp: i64, price: f64, volume: f64) -> Self {
        Self {
            index,
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}
