use alphapulse_application::config::{Config, PolicyKind, RemoteKind};
use std::path::PathBuf;

pub(super) fn engine_name() -> &'static str {
    "alphapulse"
}

pub(super) fn print_config_summary(command: &str, config: &Config, out: Option<&PathBuf>) {
    println!(
        "{} cli: {} (run_id={}, symbol={}, initial_balance={}, seed={}, episodes={})",
        engine_name(),
        command,
        config.run.run_id,
        config.run.symbol,
        config.run.initial_balance,
        config
            .run
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "entropy".to_string()),
        config.episodes()
    );
    println!(
        "data: ohlcv_csv={}, step_seconds={}, out_dir={}",
        config.data.ohlcv_csv,
        config
            .data
            .step_seconds
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string()),
        config.output.out_dir
    );
    if let Some(exec) = &config.execution {
        println!(
            "execution: slippage_std_fraction={}, fee_rate={}, fee_fixed={}",
            fmt_opt(exec.slippage_std_fraction),
            fmt_opt(exec.fee_rate),
            fmt_opt(exec.fee_fixed)
        );
    }
    println!(
        "reward: preset={}",
        config
            .reward
            .as_ref()
            .and_then(|r| r.preset.as_deref())
            .unwrap_or("risk_adjusted")
    );
    println!(
        "policy: {}",
        match config.policy.as_ref().map(|p| p.kind).unwrap_or_default() {
            PolicyKind::Hold => "hold",
            PolicyKind::Random => "random",
            PolicyKind::Scripted => "scripted",
        }
    );
    println!(
        "remote: {}",
        match config.remote_kind() {
            RemoteKind::None => "none",
            RemoteKind::Rest => "rest",
            RemoteKind::Postgres => "postgres",
        }
    );
    if let Some(out_dir) = out {
        println!("output dir: {}", out_dir.display());
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "default".to_string())
}
