use alphapulse_domain::value_objects::depth::DepthTick;
use alphapulse_domain::value_objects::epoch_record::EpochRecord;

pub mod rest;

/// Row for the `market_depth_log` table. Quantities and the top levels go
/// into the `meta_data` JSON column.
pub fn depth_row(tick: &DepthTick) -> serde_json::Value {
    serde_json::json!({
        "created_at": tick.timestamp.to_rfc3339(),
        "symbol": tick.symbol,
        "bid_price": tick.bid_price,
        "ask_price": tick.ask_price,
        "spread": tick.spread,
        "meta_data": depth_meta_data(tick),
    })
}

pub fn depth_meta_data(tick: &DepthTick) -> serde_json::Value {
    serde_json::json!({
        "bid_qty": tick.bid_qty,
        "ask_qty": tick.ask_qty,
        "imbalance": tick.imbalance,
        "top_5_bids": levels_json(&tick.top_bids),
        "top_5_asks": levels_json(&tick.top_asks),
    })
}

pub fn epoch_row(record: &EpochRecord) -> serde_json::Value {
    serde_json::json!({
        "epoch": record.epoch,
        "sharpe_ratio": record.sharpe_ratio,
        "mdd": record.mdd,
        "reward": record.reward,
    })
}

fn levels_json(levels: &[(f64, f64)]) -> serde_json::Value {
    levels
        .iter()
        .take(5)
        .map(|(price, qty)| serde_json::json!([price, qty]))
        .collect()
}
