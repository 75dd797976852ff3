use super::{depth_row, epoch_row};
use alphapulse_domain::repositories::tick_log::TickMirror;
use alphapulse_domain::repositories::training_log::TrainingLogRepository;
use alphapulse_domain::value_objects::depth::DepthTick;
use alphapulse_domain::value_objects::epoch_record::EpochRecord;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct EpochOnly {
    epoch: u64,
}

/// Table client for a PostgREST endpoint (Supabase `/rest/v1`).
pub struct RestTableClient {
    pub base_url: String,
    pub tick_table: String,
    pub training_table: String,
    api_key: String,
    client: Client,
}

impl RestTableClient {
    pub fn new(
        base_url: String,
        api_key: String,
        tick_table: String,
        training_table: String,
        timeout_ms: u64,
    ) -> Result<Self, String> {
        if base_url.trim().is_empty() {
            return Err("remote url is empty".to_string());
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            base_url,
            tick_table,
            training_table,
            api_key,
            client,
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    pub fn insert(&self, table: &str, row: &serde_json::Value) -> Result<(), String> {
        let start = Instant::now();
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .map_err(|err| {
                metrics::counter!("alphapulse.infra.rest.insert.calls_total", "result" => "err")
                    .increment(1);
                format!("insert into {table} failed: {err}")
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::counter!("alphapulse.infra.rest.insert.calls_total", "result" => "err")
                .increment(1);
            let body = response.text().unwrap_or_default();
            return Err(format!(
                "insert into {table} rejected: status {} - {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ));
        }
        metrics::counter!("alphapulse.infra.rest.insert.calls_total", "result" => "ok")
            .increment(1);
        metrics::histogram!("alphapulse.infra.rest.insert_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        Ok(())
    }
}

impl TickMirror for RestTableClient {
    fn mirror(&self, tick: &DepthTick) -> Result<(), String> {
        self.insert(&self.tick_table, &depth_row(tick))
    }
}

impl TrainingLogRepository for RestTableClient {
    fn last_epoch(&self) -> Result<Option<u64>, String> {
        let response = self
            .authorized(self.client.get(self.table_url(&self.training_table)))
            .query(&[("select", "epoch"), ("order", "epoch.desc"), ("limit", "1")])
            .send()
            .map_err(|err| format!("epoch lookup failed: {err}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("epoch lookup rejected: status {}", status.as_u16()));
        }
        let rows: Vec<EpochOnly> = response
            .json()
            .map_err(|err| format!("failed to parse epoch lookup: {err}"))?;
        Ok(rows.first().map(|row| row.epoch))
    }

    fn insert_epoch(&self, record: &EpochRecord) -> Result<(), String> {
        self.insert(&self.training_table, &epoch_row(record))
    }
}
