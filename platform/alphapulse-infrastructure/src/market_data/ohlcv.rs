use alphapulse_domain::repositories::market_data::{BarQuery, BarRepository};
use alphapulse_domain::services::ohlcv::{is_valid_bar, DataQualityReport};
use alphapulse_domain::value_objects::bar::Bar;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct OhlcvRecord {
    #[serde(alias = "timestamp_utc", alias = "time", alias = "date")]
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvBarRepository;

impl CsvBarRepository {
    pub fn new() -> Self {
        Self
    }
}

impl BarRepository for CsvBarRepository {
    fn load_bars(&self, query: &BarQuery) -> Result<(Vec<Bar>, DataQualityReport), String> {
        let _span = tracing::info_span!(
            "infra.csv.load_bars",
            path = %query.path.display(),
            symbol = %query.symbol
        )
        .entered();
        let started = Instant::now();
        let loaded = load_csv_with_step(&query.path, query.expected_step_seconds);
        metrics::histogram!("alphapulse.infra.csv.load_bars_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        if let Ok((bars, report)) = &loaded {
            tracing::debug!(
                rows = report.rows,
                bars = bars.len(),
                invalid_rows = report.invalid_rows,
                duplicates = report.duplicates,
                out_of_order = report.out_of_order,
                gaps = report.gaps,
                "loaded OHLCV"
            );
        }
        loaded
    }
}

pub fn load_csv(path: &Path) -> Result<(Vec<Bar>, DataQualityReport), String> {
    load_csv_with_step(path, None)
}

/// Reads an OHLCV CSV into bars sorted by timestamp. Rows with unusable
/// prices are skipped, a repeated timestamp keeps the last row, and every
/// anomaly is counted in the report. Bars are re-indexed from zero.
pub fn load_csv_with_step(
    path: &Path,
    expected_step_seconds: Option<i64>,
) -> Result<(Vec<Bar>, DataQualityReport), String> {
    let file = File::open(path)
        .map_err(|err| format!("failed to open OHLCV CSV {}: {}", path.display(), err))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars_by_ts: BTreeMap<i64, Bar> = BTreeMap::new();
    let mut report = DataQualityReport::default();
    let mut last_seen_ts: Option<i64> = None;

    for result in reader.deserialize::<OhlcvRecord>() {
        let record = result.map_err(|err| format!("failed to parse CSV row: {}", err))?;
        let timestamp = parse_timestamp(&record.timestamp)?;
        report.rows += 1;

        let bar = Bar {
            index: 0,
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        };
        if !is_valid_bar(&bar) {
            report.invalid_rows += 1;
            continue;
        }

        if let Some(prev) = last_seen_ts {
            if timestamp < prev {
                report.out_of_order += 1;
            }
        }
        last_seen_ts = Some(timestamp);

        if bars_by_ts.insert(timestamp, bar).is_some() {
            report.duplicates += 1;
        }
    }

    let step = expected_step_seconds.filter(|s| *s > 0);
    let mut max_gap: Option<i64> = None;
    let mut last_unique_ts: Option<i64> = None;
    let mut bars = Vec::with_capacity(bars_by_ts.len());
    for (index, (timestamp, mut bar)) in bars_by_ts.into_iter().enumerate() {
        if report.first_timestamp.is_none() {
            report.first_timestamp = Some(timestamp);
        }
        report.last_timestamp = Some(timestamp);

        if let (Some(prev), Some(step)) = (last_unique_ts, step) {
            let diff = timestamp - prev;
            if diff > step {
                report.gaps += 1;
                max_gap = Some(max_gap.map_or(diff, |current| current.max(diff)));
            }
        }
        last_unique_ts = Some(timestamp);

        bar.index = index;
        bars.push(bar);
    }

    report.max_gap_seconds = max_gap;
    Ok((bars, report))
}

fn parse_timestamp(value: &str) -> Result<i64, String> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        // Millisecond epochs are common in exchange exports.
        return Ok(if secs > 100_000_000_000 { secs / 1000 } else { secs });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%z") {
        return Ok(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        let dt: DateTime<Utc> = Utc.from_utc_datetime(&naive);
        return Ok(dt.timestamp());
    }

    Err(format!("unsupported timestamp format: {}", value))
}

#[cfg(test)]
mod tests {
    use super::{load_csv, load_csv_with_step, parse_timestamp, CsvBarRepository};
    use alphapulse_domain::repositories::market_data::{BarQuery, BarRepository};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("alphapulse_{name}_{}_{}", std::process::id(), now))
    }

    #[test]
    fn load_csv_detects_duplicates_gaps_and_invalid_rows() {
        let tmp_path = unique_tmp_path("ohlcv_test.csv");
        let csv_data = "timestamp,open,high,low,close,volume\n\
2026-01-01T00:00:00Z,1,1,1,1,1\n\
2026-01-01T00:00:00Z,2,2,2,2,2\n\
2026-01-01T00:01:00Z,1,1,1,0,1\n\
2026-01-01T00:03:00Z,1,1,1,1,1\n";
        fs::write(&tmp_path, csv_data).expect("write csv");

        let (bars, report) = load_csv_with_step(&tmp_path, Some(60)).expect("load csv");
        assert_eq!(bars.len(), 2);
        assert_eq!(report.rows, 4);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.invalid_rows, 1);
        assert_eq!(report.gaps, 1);
        assert_eq!(report.max_gap_seconds, Some(180));
        assert!((bars[0].close - 2.0).abs() < 1e-9);
        assert_eq!(bars[1].index, 1);
        let _ = fs::remove_file(&tmp_path);
    }

    #[test]
    fn load_csv_sorts_out_of_order_rows() {
        let tmp_path = unique_tmp_path("ohlcv_test_ooo.csv");
        let csv_data = "timestamp_utc,open,high,low,close,volume\n\
1700000120,3,3,3,3,1\n\
1700000000,1,1,1,1,1\n\
1700000060,2,2,2,2,1\n";
        fs::write(&tmp_path, csv_data).expect("write csv");

        let (bars, report) = load_csv(&tmp_path).expect("load csv");
        assert_eq!(report.out_of_order, 1);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
        assert_eq!(report.gaps, 0);
        let _ = fs::remove_file(&tmp_path);
    }

    #[test]
    fn repository_reports_missing_file() {
        let err = CsvBarRepository::new()
            .load_bars(&BarQuery {
                path: unique_tmp_path("missing.csv"),
                symbol: "ETHUSDT".to_string(),
                expected_step_seconds: None,
            })
            .expect_err("missing file");
        assert!(err.contains("failed to open OHLCV CSV"));
    }

    #[test]
    fn parse_timestamp_accepts_common_formats() {
        assert_eq!(parse_timestamp("1700000000").unwrap(), 1_700_000_000);
        assert_eq!(parse_timestamp("1700000000000").unwrap(), 1_700_000_000);
        assert_eq!(parse_timestamp("2023-11-14 22:13:20").unwrap(), 1_700_000_000);
        assert!(parse_timestamp("yesterday").is_err());
    }
}
