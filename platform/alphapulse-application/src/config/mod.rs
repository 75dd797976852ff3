use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_EPISODES: u32 = 1;
pub const DEFAULT_TRAINING_EPOCHS: u32 = 5;
pub const DEFAULT_COLLECTOR_SYMBOL: &str = "ETHUSDT";
pub const DEFAULT_BINANCE_BASE_URL: &str = "https://fapi.binance.com";
pub const DEFAULT_DEPTH_LIMIT: usize = 5;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_TICK_LOG_PATH: &str = "data/market_depth_log.csv";
pub const DEFAULT_TICK_TABLE: &str = "market_depth_log";
pub const DEFAULT_TRAINING_TABLE: &str = "trader_growth_log";
pub const DEFAULT_API_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const DB_URL_ENV: &str = "ALPHAPULSE_DB_URL";
pub const REST_URL_ENV: &str = "SUPABASE_URL";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub data: DataConfig,
    pub execution: Option<ExecutionConfig>,
    pub reward: Option<RewardConfig>,
    pub policy: Option<PolicyConfig>,
    pub output: OutputConfig,
    pub collector: Option<CollectorConfig>,
    pub remote: Option<RemoteConfig>,
    pub training: Option<TrainingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub run_id: String,
    pub symbol: String,
    pub initial_balance: f64,
    pub seed: Option<u64>,
    pub episodes: Option<u32>,
    pub max_episode_steps: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub ohlcv_csv: String,
    /// Expected spacing between bars, used only for gap reporting.
    pub step_seconds: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    pub slippage_std_fraction: Option<f64>,
    pub fee_rate: Option<f64>,
    pub fee_fixed: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct RewardConfig {
    pub preset: Option<String>,
    pub volatility_coefficient: Option<f64>,
    pub volatility_window: Option<usize>,
    pub volatility_min_samples: Option<usize>,
    pub drawdown_coefficient: Option<f64>,
    pub cost_rate: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Hold,
    Random,
    Scripted,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub kind: PolicyKind,
    pub script: Option<Vec<String>>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub out_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub symbol: Option<String>,
    pub base_url: Option<String>,
    pub depth_limit: Option<usize>,
    pub interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub log_path: Option<String>,
    pub max_polls: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    #[default]
    None,
    Rest,
    Postgres,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    pub kind: RemoteKind,
    pub url: Option<String>,
    pub api_key_env: Option<String>,
    pub db_url: Option<String>,
    pub pool_max_size: Option<u32>,
    pub tick_table: Option<String>,
    pub training_table: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    pub epochs: Option<u32>,
}

/// Fully defaulted collector settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorSettings {
    pub symbol: String,
    pub base_url: String,
    pub depth_limit: usize,
    pub interval_ms: u64,
    pub timeout_ms: u64,
    pub log_path: String,
    pub max_polls: Option<u64>,
}

impl Config {
    pub fn episodes(&self) -> u32 {
        self.run.episodes.unwrap_or(DEFAULT_EPISODES).max(1)
    }

    pub fn training_epochs(&self) -> u32 {
        self.training
            .as_ref()
            .and_then(|t| t.epochs)
            .unwrap_or(DEFAULT_TRAINING_EPOCHS)
    }

    pub fn remote_kind(&self) -> RemoteKind {
        self.remote.as_ref().map(|r| r.kind).unwrap_or_default()
    }

    pub fn tick_table(&self) -> String {
        self.remote
            .as_ref()
            .and_then(|r| r.tick_table.clone())
            .unwrap_or_else(|| DEFAULT_TICK_TABLE.to_string())
    }

    pub fn training_table(&self) -> String {
        self.remote
            .as_ref()
            .and_then(|r| r.training_table.clone())
            .unwrap_or_else(|| DEFAULT_TRAINING_TABLE.to_string())
    }

    pub fn collector_settings(&self) -> CollectorSettings {
        let c = self.collector.clone().unwrap_or_default();
        CollectorSettings {
            symbol: c
                .symbol
                .unwrap_or_else(|| DEFAULT_COLLECTOR_SYMBOL.to_string())
                .to_uppercase(),
            base_url: c
                .base_url
                .unwrap_or_else(|| DEFAULT_BINANCE_BASE_URL.to_string()),
            depth_limit: c.depth_limit.unwrap_or(DEFAULT_DEPTH_LIMIT),
            interval_ms: c.interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            timeout_ms: c.timeout_ms.unwrap_or(5_000),
            log_path: c
                .log_path
                .unwrap_or_else(|| DEFAULT_TICK_LOG_PATH.to_string()),
            max_polls: c.max_polls,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    Ok((config, contents))
}

pub fn to_toml_pretty(config: &Config) -> Result<String, String> {
    toml::to_string_pretty(config)
        .map_err(|err| format!("failed to serialize config as TOML: {err}"))
}

/// Value from the file if present, else from the named environment variable.
pub fn resolve_secret(from_file: Option<&str>, env_var: &str) -> Option<String> {
    from_file
        .map(|s| s.to_string())
        .or_else(|| std::env::var(env_var).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{resolve_secret, Config, PolicyKind, RemoteKind};

    const MINIMAL: &str = r#"
[run]
run_id = "eth_sim"
symbol = "ETHUSDT"
initial_balance = 100000.0

[data]
ohlcv_csv = "data/eth_1m.csv"

[output]
out_dir = "runs/"
"#;

    fn parse_config(toml_str: &str) -> Config {
        toml::from_str(toml_str).expect("config should parse")
    }

    #[test]
    fn parse_minimal_config_fills_defaults() {
        let config = parse_config(MINIMAL);
        assert_eq!(config.run.symbol, "ETHUSDT");
        assert_eq!(config.episodes(), 1);
        assert_eq!(config.training_epochs(), 5);
        assert_eq!(config.remote_kind(), RemoteKind::None);
        assert_eq!(config.tick_table(), "market_depth_log");
        assert_eq!(config.training_table(), "trader_growth_log");

        let collector = config.collector_settings();
        assert_eq!(collector.symbol, "ETHUSDT");
        assert_eq!(collector.depth_limit, 5);
        assert_eq!(collector.interval_ms, 2_000);
        assert!(collector.max_polls.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = format!(
            r#"{MINIMAL}
[execution]
slippage_std_fraction = 0.0
fee_rate = 0.0002

[reward]
preset = "spread_cost"
cost_rate = 0.001

[policy]
kind = "scripted"
script = ["buy", "hold", "close_all"]

[collector]
symbol = "btcusdt"
max_polls = 3

[remote]
kind = "rest"
url = "https://example.supabase.co"
training_table = "growth"

[training]
epochs = 2
"#
        );
        let config = parse_config(&toml_str);
        assert_eq!(config.policy.as_ref().map(|p| p.kind), Some(PolicyKind::Scripted));
        assert_eq!(config.collector_settings().symbol, "BTCUSDT");
        assert_eq!(config.remote_kind(), RemoteKind::Rest);
        assert_eq!(config.training_table(), "growth");
        assert_eq!(config.training_epochs(), 2);
    }

    #[test]
    fn parse_config_rejects_unknown_fields() {
        let toml_str = format!("{MINIMAL}\nunknown_field = 1\n");
        let err = toml::from_str::<Config>(&toml_str).expect_err("unknown field should fail");
        assert!(err.to_string().to_lowercase().contains("unknown field"));
    }

    #[test]
    fn parse_config_rejects_malformed_toml() {
        assert!(toml::from_str::<Config>("[run\nrun_id = 1").is_err());
    }

    #[test]
    fn file_value_wins_over_environment() {
        assert_eq!(
            resolve_secret(Some(" postgres://x "), "ALPHAPULSE_TEST_UNSET_VAR"),
            Some("postgres://x".to_string())
        );
        assert_eq!(resolve_secret(None, "ALPHAPULSE_TEST_UNSET_VAR"), None);
        assert_eq!(resolve_secret(Some("  "), "ALPHAPULSE_TEST_UNSET_VAR"), None);
    }
}
