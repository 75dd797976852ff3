use alphapulse_domain::repositories::market_depth::OrderBookSource;
use alphapulse_domain::value_objects::depth::{DepthLevel, DepthSnapshot};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Binance returns each level as `["price", "qty"]` strings.
#[derive(Debug, Deserialize)]
struct DepthResponse {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

/// Order-book poller for the Binance USDⓈ-M futures REST API
/// (`GET /fapi/v1/depth`).
pub struct BinanceDepthClient {
    pub base_url: String,
    client: Client,
}

impl BinanceDepthClient {
    pub fn new(base_url: String, timeout_ms: u64) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self { base_url, client })
    }

    pub fn endpoint(&self, symbol: &str, limit: usize) -> String {
        format!(
            "{}/fapi/v1/depth?symbol={}&limit={}",
            self.base_url.trim_end_matches('/'),
            symbol,
            limit
        )
    }
}

impl OrderBookSource for BinanceDepthClient {
    fn fetch_depth(&self, symbol: &str, limit: usize) -> Result<DepthSnapshot, String> {
        let endpoint = self.endpoint(symbol, limit);
        let start = Instant::now();
        let response = self.client.get(&endpoint).send().map_err(|err| {
            metrics::counter!("alphapulse.infra.binance.depth.calls_total", "result" => "err")
                .increment(1);
            format!("depth request failed: {err}")
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            metrics::counter!("alphapulse.infra.binance.depth.calls_total", "result" => "err")
                .increment(1);
            let body = response.text().unwrap_or_default();
            return Err(format!(
                "depth http error: status {} - {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ));
        }

        let parsed: DepthResponse = response
            .json()
            .map_err(|err| format!("failed to parse depth response: {err}"))?;
        metrics::counter!("alphapulse.infra.binance.depth.calls_total", "result" => "ok")
            .increment(1);
        metrics::histogram!("alphapulse.infra.binance.depth_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);

        parse_depth(symbol, parsed)
    }
}

fn parse_depth(symbol: &str, response: DepthResponse) -> Result<DepthSnapshot, String> {
    Ok(DepthSnapshot {
        symbol: symbol.to_string(),
        bids: parse_levels(&response.bids)?,
        asks: parse_levels(&response.asks)?,
    })
}

fn parse_levels(levels: &[[String; 2]]) -> Result<Vec<DepthLevel>, String> {
    levels
        .iter()
        .map(|[price, qty]| {
            let price = price
                .parse::<f64>()
                .map_err(|err| format!("invalid depth price '{price}': {err}"))?;
            let qty = qty
                .parse::<f64>()
                .map_err(|err| format!("invalid depth quantity '{qty}': {err}"))?;
            Ok((price, qty))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_depth, BinanceDepthClient, DepthResponse};

    #[test]
    fn endpoint_targets_futures_depth() {
        let client = BinanceDepthClient::new("https://fapi.binance.com/".to_string(), 1_000)
            .expect("client");
        assert_eq!(
            client.endpoint("ETHUSDT", 5),
            "https://fapi.binance.com/fapi/v1/depth?symbol=ETHUSDT&limit=5"
        );
    }

    #[test]
    fn parses_string_levels() {
        let body = r#"{
            "lastUpdateId": 1027024,
            "E": 1589436922972,
            "T": 1589436922959,
            "bids": [["2000.10", "3.5"], ["2000.00", "1.0"]],
            "asks": [["2000.20", "0.5"]]
        }"#;
        let response: DepthResponse = serde_json::from_str(body).expect("json");
        let snapshot = parse_depth("ETHUSDT", response).expect("depth");
        assert_eq!(snapshot.bids[0], (2000.10, 3.5));
        assert_eq!(snapshot.asks.len(), 1);
    }

    #[test]
    fn rejects_malformed_levels() {
        let response = DepthResponse {
            bids: vec![["abc".to_string(), "1".to_string()]],
            asks: Vec::new(),
        };
        assert!(parse_depth("ETHUSDT", response).is_err());
    }
}
