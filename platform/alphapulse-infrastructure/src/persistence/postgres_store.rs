use crate::remote::depth_meta_data;
use alphapulse_domain::repositories::tick_log::TickMirror;
use alphapulse_domain::repositories::training_log::TrainingLogRepository;
use alphapulse_domain::value_objects::depth::DepthTick;
use alphapulse_domain::value_objects::epoch_record::EpochRecord;
use postgres::NoTls;
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;
use std::time::Instant;

type PgPool = Pool<PostgresConnectionManager<NoTls>>;

/// Direct Postgres access for the depth and growth tables, through a small
/// connection pool. Connections are checked out per call and returned on drop.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    pub tick_table: String,
    pub training_table: String,
}

impl PostgresStore {
    pub fn new(
        db_url: &str,
        tick_table: String,
        training_table: String,
        pool_max_size: u32,
    ) -> Result<Self, String> {
        validate_table_name(&tick_table)
            .map_err(|err| format!("invalid tick_table '{}': {}", tick_table, err))?;
        validate_table_name(&training_table)
            .map_err(|err| format!("invalid training_table '{}': {}", training_table, err))?;

        let config = db_url
            .parse::<postgres::Config>()
            .map_err(|err| format!("invalid postgres db url: {err}"))?;
        let manager = PostgresConnectionManager::new(config, NoTls);
        let pool = Pool::builder()
            .max_size(pool_max_size.max(1))
            .build_unchecked(manager);

        Ok(Self {
            pool,
            tick_table,
            training_table,
        })
    }

    fn checkout(
        &self,
    ) -> Result<PooledConnection<PostgresConnectionManager<NoTls>>, String> {
        let get_start = Instant::now();
        let client = self.pool.get().map_err(|err| {
            metrics::counter!("alphapulse.infra.postgres.pool.get.errors_total").increment(1);
            tracing::error!(error = %err, "failed to checkout postgres connection");
            format!("failed to checkout postgres connection: {err}")
        })?;
        metrics::histogram!("alphapulse.infra.postgres.pool.get_ms")
            .record(get_start.elapsed().as_secs_f64() * 1000.0);
        Ok(client)
    }

    /// Runs a migration script as one batch.
    pub fn migrate(&self, sql: &str) -> Result<(), String> {
        let _span = tracing::info_span!("infra.postgres.migrate").entered();
        let mut client = self.checkout()?;
        client
            .batch_execute(sql)
            .map_err(|err| format!("failed to apply migration: {err}"))?;
        tracing::info!("schema migration applied");
        Ok(())
    }
}

impl TickMirror for PostgresStore {
    fn mirror(&self, tick: &DepthTick) -> Result<(), String> {
        let mut client = self.checkout()?;
        let statement = format!(
            "INSERT INTO {} (created_at, symbol, bid_price, ask_price, spread, meta_data) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            self.tick_table
        );
        let meta = depth_meta_data(tick);
        client
            .execute(
                &statement,
                &[
                    &tick.timestamp,
                    &tick.symbol,
                    &tick.bid_price,
                    &tick.ask_price,
                    &tick.spread,
                    &meta,
                ],
            )
            .map_err(|err| format!("failed to insert tick: {err}"))?;
        metrics::counter!("alphapulse.infra.postgres.ticks_inserted_total").increment(1);
        Ok(())
    }
}

impl TrainingLogRepository for PostgresStore {
    fn last_epoch(&self) -> Result<Option<u64>, String> {
        let mut client = self.checkout()?;
        let query = format!("SELECT MAX(epoch)::BIGINT FROM {}", self.training_table);
        let row = client
            .query_one(&query, &[])
            .map_err(|err| format!("failed to query last epoch: {err}"))?;
        let last: Option<i64> = row.get(0);
        Ok(last.map(|epoch| epoch.max(0) as u64))
    }

    fn insert_epoch(&self, record: &EpochRecord) -> Result<(), String> {
        let mut client = self.checkout()?;
        let statement = format!(
            "INSERT INTO {} (epoch, sharpe_ratio, mdd, reward) VALUES ($1, $2, $3, $4)",
            self.training_table
        );
        let epoch = i64::try_from(record.epoch)
            .map_err(|_| format!("epoch {} does not fit in BIGINT", record.epoch))?;
        client
            .execute(
                &statement,
                &[&epoch, &record.sharpe_ratio, &record.mdd, &record.reward],
            )
            .map_err(|err| format!("failed to insert epoch: {err}"))?;
        Ok(())
    }
}

fn validate_table_name(table: &str) -> Result<(), String> {
    if table.is_empty() {
        return Err("table name is empty".to_string());
    }
    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() > 2 {
        return Err(format!("invalid table name: {table}"));
    }
    for part in parts {
        let mut chars = part.chars();
        let Some(first) = chars.next() else {
            return Err(format!("invalid table name: {table}"));
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(format!("invalid table name: {table}"));
        }
        if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(format!("invalid table name: {table}"));
        }
    }
    Ok(())
}
