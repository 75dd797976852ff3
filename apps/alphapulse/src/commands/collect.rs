use alphapulse_application::collection::{run_collector, StopFlag};
use alphapulse_infrastructure::tick_log::CsvTickLog;
use std::path::{Path, PathBuf};
use std::thread;

pub(super) fn run_collect(config_path: PathBuf, max_polls: Option<u64>) -> Result<(), String> {
    let config = alphapulse_application::config::load_config(&config_path)?;
    let mut settings = config.collector_settings();
    if max_polls.is_some() {
        settings.max_polls = max_polls;
    }
    println!(
        "{} cli: collect (symbol={}, interval_ms={}, depth_limit={}, log_path={}, max_polls={})",
        super::common::engine_name(),
        settings.symbol,
        settings.interval_ms,
        settings.depth_limit,
        settings.log_path,
        settings
            .max_polls
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unbounded".to_string())
    );

    let crate::infra::CollectorDeps { source, mirror } =
        crate::infra::build_collector_deps(&config)?;
    let mut tick_log = CsvTickLog::open(Path::new(&settings.log_path))?;

    let stop = StopFlag::new();
    spawn_ctrl_c_watcher(stop.clone())?;

    let stats = run_collector(
        &settings,
        source.as_ref(),
        &mut tick_log,
        mirror.as_deref(),
        &stop,
        &chrono::Utc::now,
    );

    println!(
        "collector stopped: polls={}, ticks_logged={}, fetch_errors={}, log_errors={}, mirror_errors={}",
        stats.polls, stats.ticks_logged, stats.fetch_errors, stats.log_errors, stats.mirror_errors
    );
    println!("tick log: {}", tick_log.path().display());
    Ok(())
}

/// Requests a stop on the first Ctrl-C. The watcher thread is detached and
/// dies with the process.
fn spawn_ctrl_c_watcher(stop: StopFlag) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("failed to build signal runtime: {err}"))?;
    thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("ctrl-c received; stopping collector after current poll");
                        stop.request_stop();
                    }
                    Err(err) => tracing::warn!(error = %err, "failed to listen for ctrl-c"),
                }
            });
        })
        .map_err(|err| format!("failed to spawn ctrl-c watcher: {err}"))?;
    Ok(())
}
