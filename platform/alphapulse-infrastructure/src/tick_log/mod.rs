use alphapulse_domain::repositories::tick_log::TickLog;
use alphapulse_domain::value_objects::depth::DepthTick;
use chrono::SecondsFormat;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const TICK_LOG_HEADER: [&str; 6] = [
    "timestamp",
    "symbol",
    "bid_price",
    "ask_price",
    "spread",
    "imbalance",
];

/// Append-only CSV tick log. The header is written only when the file is
/// created (or found empty); existing rows are never rewritten.
pub struct CsvTickLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvTickLog {
    pub fn open(path: &Path) -> Result<Self, String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create dir {}: {}", parent.display(), err))?;
        }
        let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| format!("failed to open tick log {}: {}", path.display(), err))?;
        let mut writer = csv::Writer::from_writer(file);
        if needs_header {
            writer
                .write_record(TICK_LOG_HEADER)
                .map_err(|err| format!("failed to write tick log header: {}", err))?;
            writer
                .flush()
                .map_err(|err| format!("failed to flush tick log: {}", err))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TickLog for CsvTickLog {
    fn append(&mut self, tick: &DepthTick) -> Result<(), String> {
        self.writer
            .write_record([
                tick.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                tick.symbol.clone(),
                tick.bid_price.to_string(),
                tick.ask_price.to_string(),
                tick.spread.to_string(),
                tick.imbalance.to_string(),
            ])
            .map_err(|err| format!("failed to write tick row: {}", err))?;
        self.writer
            .flush()
            .map_err(|err| format!("failed to flush tick log {}: {}", self.path.display(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::CsvTickLog;
    use alphapulse_domain::repositories::tick_log::TickLog;
    use alphapulse_domain::value_objects::depth::{DepthSnapshot, DepthTick};
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir()
            .join(format!("alphapulse_{}_{}", std::process::id(), now))
            .join(name)
    }

    fn tick(secs: i64) -> DepthTick {
        let snapshot = DepthSnapshot {
            symbol: "ETHUSDT".to_string(),
            bids: vec![(2000.0, 1.0)],
            asks: vec![(2000.5, 3.0)],
        };
        DepthTick::from_snapshot(&snapshot, Utc.timestamp_opt(secs, 0).unwrap()).unwrap()
    }

    #[test]
    fn header_is_written_once_across_reopen() {
        let path = unique_tmp_path("market_depth_log.csv");
        {
            let mut log = CsvTickLog::open(&path).expect("open");
            log.append(&tick(1_700_000_000)).expect("append");
        }
        {
            let mut log = CsvTickLog::open(&path).expect("reopen");
            log.append(&tick(1_700_000_002)).expect("append");
        }

        let contents = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,symbol,bid_price,ask_price,spread,imbalance");
        assert!(lines[1].starts_with("2023-11-14T22:13:20.000000Z,ETHUSDT,2000,2000.5,0.5,-0.5"));
        assert!(lines[2].starts_with("2023-11-14T22:13:22"));
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
