use alphapulse_application::config::TrainingConfig;
use std::path::PathBuf;

pub(super) fn run_train_report(config_path: PathBuf, epochs: Option<u32>) -> Result<(), String> {
    let mut config = alphapulse_application::config::load_config(&config_path)?;
    if let Some(epochs) = epochs {
        config.training = Some(TrainingConfig {
            epochs: Some(epochs),
        });
    }
    super::common::print_config_summary("train-report", &config, None);

    let crate::infra::TrainingDeps { market_data, log } =
        crate::infra::build_training_deps(&config)?;

    let report = alphapulse_application::training::report_training(
        &config,
        market_data.as_ref(),
        log.as_ref(),
    )?;

    for record in &report.records {
        println!(
            "epoch {}: sharpe_ratio={} mdd={} reward={}",
            record.epoch, record.sharpe_ratio, record.mdd, record.reward
        );
    }
    println!(
        "training report: start_epoch={}, epochs={}, failed_inserts={}",
        report.start_epoch,
        report.records.len(),
        report.failed_inserts
    );
    Ok(())
}
