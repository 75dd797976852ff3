use crate::value_objects::bar::Bar;
use serde::Serialize;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub rows: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
    pub invalid_rows: usize,
    pub gaps: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub max_gap_seconds: Option<i64>,
}

impl DataQualityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0 && self.out_of_order == 0 && self.invalid_rows == 0
    }
}

/// Bars fed to the environment must be strictly positive and finite in every
/// field the observation space exposes.
pub fn is_valid_bar(bar: &Bar) -> bool {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    prices.iter().all(|p| p.is_finite() && *p > 0.0)
        && bar.volume.is_finite()
        && bar.volume >= 0.0
        && bar.low <= bar.high
}

pub fn data_quality_from_bars(bars: &[Bar], expected_step_seconds: Option<i64>) -> DataQualityReport {
    let mut report = DataQualityReport {
        rows: bars.len(),
        ..DataQualityReport::default()
    };
    if bars.is_empty() {
        return report;
    }

    let step = expected_step_seconds.filter(|s| *s > 0);
    report.first_timestamp = Some(bars[0].timestamp);

    let mut last_ts: Option<i64> = None;
    for bar in bars {
        if !is_valid_bar(bar) {
            report.invalid_rows += 1;
        }
        let ts = bar.timestamp;
        if let Some(prev) = last_ts {
            if ts == prev {
                report.duplicates += 1;
            } else if ts < prev {
                report.out_of_order += 1;
            } else if step.is_some_and(|step| ts - prev > step) {
                report.gaps += 1;
                let diff = ts - prev;
                report.max_gap_seconds =
                    Some(report.max_gap_seconds.map_or(diff, |current| current.max(diff)));
            }
        }
        last_ts = Some(ts);
        report.last_timestamp = Some(ts);
    }

    report
}
