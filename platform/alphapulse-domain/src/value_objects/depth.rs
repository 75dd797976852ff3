use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One price level as returned by the exchange: `(price, quantity)`.
pub type DepthLevel = (f64, f64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub symbol: String,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

/// Best bid/offer summary derived from one depth poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthTick {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub bid_price: f64,
    pub bid_qty: f64,
    pub ask_price: f64,
    pub ask_qty: f64,
    pub spread: f64,
    pub imbalance: f64,
    pub top_bids: Vec<DepthLevel>,
    pub top_asks: Vec<DepthLevel>,
}

impl DepthTick {
    pub fn from_snapshot(snapshot: &DepthSnapshot, timestamp: DateTime<Utc>) -> Result<Self, String> {
        let (bid_price, bid_qty) = *snapshot
            .bids
            .first()
            .ok_or_else(|| format!("empty bid side for {}", snapshot.symbol))?;
        let (ask_price, ask_qty) = *snapshot
            .asks
            .first()
            .ok_or_else(|| format!("empty ask side for {}", snapshot.symbol))?;

        let total_qty = bid_qty + ask_qty;
        let imbalance = if total_qty > 0.0 {
            (bid_qty - ask_qty) / total_qty
        } else {
            0.0
        };

        Ok(Self {
            timestamp,
            symbol: snapshot.symbol.clone(),
            bid_price,
            bid_qty,
            ask_price,
            ask_qty,
            spread: ask_price - bid_price,
            imbalance,
            top_bids: snapshot.bids.clone(),
            top_asks: snapshot.asks.clone(),
        })
    }
}
