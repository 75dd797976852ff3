use alphapulse_application::config::{
    resolve_secret, Config, RemoteKind, DB_URL_ENV, DEFAULT_API_KEY_ENV, REST_URL_ENV,
};
use alphapulse_domain::repositories::artifacts::ArtifactWriter;
use alphapulse_domain::repositories::market_data::BarRepository;
use alphapulse_domain::repositories::market_depth::OrderBookSource;
use alphapulse_domain::repositories::tick_log::TickMirror;
use alphapulse_domain::repositories::training_log::TrainingLogRepository;
use alphapulse_infrastructure::artifacts::FilesystemArtifactWriter;
use alphapulse_infrastructure::market_data::ohlcv::CsvBarRepository;
use alphapulse_infrastructure::market_depth::binance::BinanceDepthClient;
use alphapulse_infrastructure::persistence::postgres_store::PostgresStore;
use alphapulse_infrastructure::remote::rest::RestTableClient;

const DEFAULT_POOL_MAX_SIZE: u32 = 4;
const REMOTE_TIMEOUT_MS: u64 = 10_000;

pub struct SimulateDeps {
    pub market_data: Box<dyn BarRepository>,
    pub artifacts: Box<dyn ArtifactWriter>,
}

pub struct ValidateDeps {
    pub market_data: Box<dyn BarRepository>,
}

pub struct TrainingDeps {
    pub market_data: Box<dyn BarRepository>,
    pub log: Box<dyn TrainingLogRepository>,
}

pub struct CollectorDeps {
    pub source: Box<dyn OrderBookSource>,
    pub mirror: Option<Box<dyn TickMirror>>,
}

pub fn build_simulate_deps() -> SimulateDeps {
    SimulateDeps {
        market_data: Box::new(CsvBarRepository::new()),
        artifacts: Box::new(FilesystemArtifactWriter::new()),
    }
}

pub fn build_validate_deps() -> ValidateDeps {
    ValidateDeps {
        market_data: Box::new(CsvBarRepository::new()),
    }
}

pub fn build_training_deps(config: &Config) -> Result<TrainingDeps, String> {
    let log: Box<dyn TrainingLogRepository> = match config.remote_kind() {
        RemoteKind::Rest => Box::new(build_rest_client(config)?),
        RemoteKind::Postgres => Box::new(build_postgres_store(config, None)?),
        RemoteKind::None => {
            return Err(
                "train-report needs a growth log: set [remote] kind = \"rest\" | \"postgres\""
                    .to_string(),
            )
        }
    };
    Ok(TrainingDeps {
        market_data: Box::new(CsvBarRepository::new()),
        log,
    })
}

pub fn build_collector_deps(config: &Config) -> Result<CollectorDeps, String> {
    let settings = config.collector_settings();
    let mirror: Option<Box<dyn TickMirror>> = match config.remote_kind() {
        RemoteKind::Rest => Some(Box::new(build_rest_client(config)?)),
        RemoteKind::Postgres => Some(Box::new(build_postgres_store(config, None)?)),
        RemoteKind::None => None,
    };
    Ok(CollectorDeps {
        source: Box::new(BinanceDepthClient::new(
            settings.base_url,
            settings.timeout_ms,
        )?),
        mirror,
    })
}

pub fn build_postgres_store(
    config: &Config,
    db_url_override: Option<&str>,
) -> Result<PostgresStore, String> {
    let remote = config.remote.as_ref();
    let db_url = db_url_override
        .map(|s| s.to_string())
        .or_else(|| resolve_secret(remote.and_then(|r| r.db_url.as_deref()), DB_URL_ENV))
        .ok_or_else(|| format!("missing remote.db_url in config and env {DB_URL_ENV} is not set"))?;
    PostgresStore::new(
        &db_url,
        config.tick_table(),
        config.training_table(),
        remote
            .and_then(|r| r.pool_max_size)
            .unwrap_or(DEFAULT_POOL_MAX_SIZE),
    )
}

/// Postgres store for `migrate` when no config file is given.
pub fn build_postgres_store_from_url(db_url: Option<&str>) -> Result<PostgresStore, String> {
    let db_url = resolve_secret(db_url, DB_URL_ENV)
        .ok_or_else(|| format!("missing --db-url and env {DB_URL_ENV} is not set"))?;
    PostgresStore::new(
        &db_url,
        alphapulse_application::config::DEFAULT_TICK_TABLE.to_string(),
        alphapulse_application::config::DEFAULT_TRAINING_TABLE.to_string(),
        1,
    )
}

fn build_rest_client(config: &Config) -> Result<RestTableClient, String> {
    let remote = config.remote.as_ref();
    let url = resolve_secret(remote.and_then(|r| r.url.as_deref()), REST_URL_ENV)
        .ok_or_else(|| format!("missing remote.url in config and env {REST_URL_ENV} is not set"))?;
    let key_env = remote
        .and_then(|r| r.api_key_env.as_deref())
        .unwrap_or(DEFAULT_API_KEY_ENV);
    let api_key = resolve_secret(None, key_env)
        .ok_or_else(|| format!("env {key_env} is not set (remote api key)"))?;
    RestTableClient::new(
        url,
        api_key,
        config.tick_table(),
        config.training_table(),
        REMOTE_TIMEOUT_MS,
    )
}
