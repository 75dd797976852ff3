use crate::config::CollectorSettings;
use alphapulse_domain::repositories::market_depth::OrderBookSource;
use alphapulse_domain::repositories::tick_log::{TickLog, TickMirror};
use alphapulse_domain::value_objects::depth::DepthTick;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn};

/// Pacing and cancellation for the polling loop.
pub trait RunControl {
    fn should_stop(&self) -> bool;
    /// Waits up to `duration`; returns `false` if a stop was requested.
    fn wait(&self, duration: Duration) -> bool;
}

/// Stop flag shared with a signal handler. Waits in short slices so a stop
/// request is honoured well before the poll interval elapses.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    stop: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl RunControl for StopFlag {
    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn wait(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.should_stop() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(Duration::from_millis(100)));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub polls: u64,
    pub ticks_logged: u64,
    pub fetch_errors: u64,
    pub log_errors: u64,
    pub mirror_errors: u64,
}

/// Polls the order book at a fixed interval. Each tick goes to the local log
/// first and to the optional mirror second. No single failure ends the loop;
/// it stops on `max_polls` or when `control` requests a stop.
pub fn run_collector(
    settings: &CollectorSettings,
    source: &dyn OrderBookSource,
    tick_log: &mut dyn TickLog,
    mirror: Option<&dyn TickMirror>,
    control: &dyn RunControl,
    now: &dyn Fn() -> DateTime<Utc>,
) -> CollectorStats {
    let _span = info_span!(
        "run_collector",
        symbol = %settings.symbol,
        interval_ms = settings.interval_ms
    )
    .entered();
    info!(mirror = mirror.is_some(), "collector started");

    let mut stats = CollectorStats::default();
    let interval = Duration::from_millis(settings.interval_ms);

    while !control.should_stop() {
        if settings.max_polls.is_some_and(|max| stats.polls >= max) {
            break;
        }
        stats.polls += 1;
        metrics::counter!("alphapulse.collector.polls").increment(1);

        if let Some(tick) = poll_once(settings, source, now, &mut stats) {
            record_tick(&tick, tick_log, mirror, &mut stats);
        }

        if settings.max_polls.is_some_and(|max| stats.polls >= max) {
            break;
        }
        if !control.wait(interval) {
            break;
        }
    }

    info!(
        polls = stats.polls,
        ticks_logged = stats.ticks_logged,
        fetch_errors = stats.fetch_errors,
        mirror_errors = stats.mirror_errors,
        "collector stopped"
    );
    stats
}

fn poll_once(
    settings: &CollectorSettings,
    source: &dyn OrderBookSource,
    now: &dyn Fn() -> DateTime<Utc>,
    stats: &mut CollectorStats,
) -> Option<DepthTick> {
    let stage_start = Instant::now();
    let snapshot = match source.fetch_depth(&settings.symbol, settings.depth_limit) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            stats.fetch_errors += 1;
            metrics::counter!("alphapulse.collector.fetch_errors").increment(1);
            warn!(error = %err, "order book poll failed");
            return None;
        }
    };
    metrics::histogram!("alphapulse.collector.fetch_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    match DepthTick::from_snapshot(&snapshot, now()) {
        Ok(tick) => Some(tick),
        Err(err) => {
            stats.fetch_errors += 1;
            metrics::counter!("alphapulse.collector.fetch_errors").increment(1);
            warn!(error = %err, "order book snapshot unusable");
            None
        }
    }
}

fn record_tick(
    tick: &DepthTick,
    tick_log: &mut dyn TickLog,
    mirror: Option<&dyn TickMirror>,
    stats: &mut CollectorStats,
) {
    info!(
        symbol = %tick.symbol,
        bid = tick.bid_price,
        ask = tick.ask_price,
        spread = tick.spread,
        imbalance = tick.imbalance,
        "tick"
    );

    match tick_log.append(tick) {
        Ok(()) => {
            stats.ticks_logged += 1;
            metrics::counter!("alphapulse.collector.ticks_logged").increment(1);
        }
        Err(err) => {
            stats.log_errors += 1;
            metrics::counter!("alphapulse.collector.log_errors").increment(1);
            error!(error = %err, "failed to append tick to local log");
        }
    }

    if let Some(mirror) = mirror {
        if let Err(err) = mirror.mirror(tick) {
            stats.mirror_errors += 1;
            metrics::counter!("alphapulse.collector.mirror_errors").increment(1);
            warn!(error = %err, "tick mirror failed");
        }
    }
}
