use std::path::PathBuf;

pub(super) fn run_simulate(config_path: PathBuf, out: Option<PathBuf>) -> Result<(), String> {
    let (config, config_toml) =
        alphapulse_application::config::load_config_with_source(&config_path)?;
    super::common::print_config_summary("simulate", &config, out.as_ref());

    let overall_start = std::time::Instant::now();

    let crate::infra::SimulateDeps {
        market_data,
        artifacts,
    } = crate::infra::build_simulate_deps();

    let report = alphapulse_application::simulation::run_simulation(
        &config,
        &config_toml,
        out,
        market_data.as_ref(),
        artifacts.as_ref(),
    )?;

    println!(
        "data quality: rows={}, duplicates={}, out_of_order={}, invalid_rows={}, gaps={}",
        report.data_quality.rows,
        report.data_quality.duplicates,
        report.data_quality.out_of_order,
        report.data_quality.invalid_rows,
        report.data_quality.gaps
    );
    for (episode, summary) in report.summaries.iter().enumerate() {
        println!(
            "episode {}: policy={} steps={} trades={} total_reward={:.4} net_profit={:.2} sharpe={:.4} max_drawdown={:.4}",
            episode + 1,
            summary.policy,
            summary.steps,
            summary.trades,
            summary.total_reward,
            summary.net_profit,
            summary.sharpe,
            summary.max_drawdown
        );
    }
    println!("run output: {}", report.run_dir.display());
    println!(
        "{} cli: simulate total_ms={}",
        super::common::engine_name(),
        overall_start.elapsed().as_millis()
    );
    Ok(())
}
