use crate::config::Config;
use crate::shared::{build_policy, episode_seed, resolve_env_config};
use crate::simulation::load_dataset;
use alphapulse_domain::repositories::market_data::BarRepository;
use alphapulse_domain::repositories::training_log::TrainingLogRepository;
use alphapulse_domain::services::environment::TradingEnv;
use alphapulse_domain::services::market_data_source::VecBarFeed;
use alphapulse_domain::services::rollout::run_episode;
use alphapulse_domain::value_objects::epoch_record::EpochRecord;
use tracing::{info, info_span, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub start_epoch: u64,
    pub records: Vec<EpochRecord>,
    pub failed_inserts: usize,
}

/// First epoch number for a new session: one past the last stored epoch, or
/// 1 when the log is empty or cannot be read.
pub fn resume_epoch(log: &dyn TrainingLogRepository) -> u64 {
    match log.last_epoch() {
        Ok(Some(last)) => {
            info!(last_epoch = last, "resuming training log");
            last.saturating_add(1)
        }
        Ok(None) => 1,
        Err(err) => {
            warn!(error = %err, "failed to read last epoch; starting from 1");
            metrics::counter!("alphapulse.training.resume_failures").increment(1);
            1
        }
    }
}

/// Runs one evaluation episode per epoch and appends its statistics to the
/// growth log. Insert failures are logged and counted but never stop the
/// session.
pub fn report_training(
    config: &Config,
    market_data: &dyn BarRepository,
    log: &dyn TrainingLogRepository,
) -> Result<TrainingReport, String> {
    let _span = info_span!(
        "report_training",
        run_id = %config.run.run_id,
        symbol = %config.run.symbol
    )
    .entered();

    let (bars, _report) = load_dataset(config, market_data)?;
    let mut env = TradingEnv::new(VecBarFeed::new(bars)?, resolve_env_config(config, None)?)?;

    let start_epoch = resume_epoch(log);
    let epochs = config.training_epochs();
    let mut records = Vec::with_capacity(epochs as usize);
    let mut failed_inserts = 0usize;

    for offset in 0..epochs {
        let epoch = start_epoch + offset as u64;
        let mut policy = build_policy(config, offset)?;
        let trace = run_episode(&mut env, policy.as_mut(), episode_seed(config, offset))?;
        let record = EpochRecord::rounded(
            epoch,
            trace.summary.sharpe,
            trace.summary.max_drawdown,
            trace.summary.total_reward,
        );

        match log.insert_epoch(&record) {
            Ok(()) => {
                metrics::counter!("alphapulse.training.epochs_reported").increment(1);
                info!(
                    epoch = record.epoch,
                    sharpe_ratio = record.sharpe_ratio,
                    mdd = record.mdd,
                    reward = record.reward,
                    "epoch reported"
                );
            }
            Err(err) => {
                failed_inserts += 1;
                metrics::counter!("alphapulse.training.insert_failures").increment(1);
                warn!(epoch = record.epoch, error = %err, "failed to upload epoch stats");
            }
        }
        records.push(record);
    }

    Ok(TrainingReport {
        start_epoch,
        records,
        failed_inserts,
    })
}
