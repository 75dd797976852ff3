use crate::config::Config;
use crate::shared::{build_policy, config_sha256, episode_seed, resolve_env_config};
use alphapulse_domain::repositories::artifacts::ArtifactWriter;
use alphapulse_domain::repositories::market_data::{BarQuery, BarRepository};
use alphapulse_domain::services::environment::TradingEnv;
use alphapulse_domain::services::market_data_source::VecBarFeed;
use alphapulse_domain::services::ohlcv::DataQualityReport;
use alphapulse_domain::services::rollout::{run_episode, EpisodeSummary};
use alphapulse_domain::value_objects::bar::Bar;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, info_span};

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub run_dir: PathBuf,
    pub data_quality: DataQualityReport,
    pub summaries: Vec<EpisodeSummary>,
}

pub fn load_dataset(
    config: &Config,
    market_data: &dyn BarRepository,
) -> Result<(Vec<Bar>, DataQualityReport), String> {
    let stage_start = Instant::now();
    let loaded = market_data.load_bars(&BarQuery {
        path: PathBuf::from(&config.data.ohlcv_csv),
        symbol: config.run.symbol.clone(),
        expected_step_seconds: config.data.step_seconds,
    })?;
    metrics::histogram!("alphapulse.sim.load_bars_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    Ok(loaded)
}

/// Rolls the configured baseline policy through `run.episodes` episodes and
/// writes `trajectory.csv`, `summary.json` and `config.toml` under
/// `<out_dir>/<run_id>/`. With more than one episode the per-episode files
/// carry an `_ep<N>` suffix.
pub fn run_simulation(
    config: &Config,
    config_toml: &str,
    out: Option<PathBuf>,
    market_data: &dyn BarRepository,
    artifacts: &dyn ArtifactWriter,
) -> Result<SimulationReport, String> {
    let _span = info_span!(
        "run_simulation",
        run_id = %config.run.run_id,
        symbol = %config.run.symbol
    )
    .entered();

    let (bars, data_quality) = load_dataset(config, market_data)?;
    let first_timestamp = bars.first().map(|b| b.timestamp);
    let last_timestamp = bars.last().map(|b| b.timestamp);
    let feed = VecBarFeed::new(bars)?;
    let env_config = resolve_env_config(config, None)?;
    let mut env = TradingEnv::new(feed, env_config)?;

    let base_dir = out.unwrap_or_else(|| PathBuf::from(&config.output.out_dir));
    let run_dir = base_dir.join(&config.run.run_id);
    artifacts.ensure_dir(&run_dir)?;

    let config_hash = config_sha256(config_toml);
    let episodes = config.episodes();
    let mut summaries = Vec::with_capacity(episodes as usize);

    for episode in 0..episodes {
        let mut policy = build_policy(config, episode)?;
        let seed = episode_seed(config, episode);

        let stage_start = Instant::now();
        let trace = run_episode(&mut env, policy.as_mut(), seed)?;
        let engine_ms = stage_start.elapsed().as_millis() as f64;
        metrics::histogram!("alphapulse.sim.episode_ms").record(engine_ms);
        metrics::counter!("alphapulse.sim.steps").increment(trace.summary.steps as u64);
        metrics::counter!("alphapulse.sim.trades").increment(trace.summary.trades as u64);

        let suffix = if episodes > 1 {
            format!("_ep{}", episode + 1)
        } else {
            String::new()
        };
        artifacts.write_trajectory_csv(
            run_dir.join(format!("trajectory{suffix}.csv")).as_path(),
            &trace.transitions,
        )?;
        let meta = serde_json::json!({
            "run_id": config.run.run_id,
            "symbol": config.run.symbol,
            "episode": episode + 1,
            "episodes": episodes,
            "seed": seed,
            "bars": env.len(),
            "start": first_timestamp,
            "end": last_timestamp,
            "config_sha256": config_hash,
        });
        artifacts.write_summary_json(
            run_dir.join(format!("summary{suffix}.json")).as_path(),
            &trace.summary,
            &meta,
        )?;

        info!(
            episode = episode + 1,
            steps = trace.summary.steps,
            total_reward = trace.summary.total_reward,
            final_equity = trace.summary.final_equity,
            "episode finished"
        );
        summaries.push(trace.summary);
    }

    artifacts.write_config_snapshot_toml(run_dir.join("config.toml").as_path(), config_toml)?;

    Ok(SimulationReport {
        run_dir,
        data_quality,
        summaries,
    })
}
