use crate::config::Config;
use crate::simulation::load_dataset;
use alphapulse_domain::repositories::market_data::BarRepository;
use alphapulse_domain::services::ohlcv::DataQualityReport;
use tracing::info_span;

/// Loads the configured dataset and reports its data-quality counts. In
/// `strict` mode any duplicate, out-of-order or invalid row is an error.
pub fn validate(
    config: &Config,
    strict: bool,
    market_data: &dyn BarRepository,
) -> Result<serde_json::Value, String> {
    let _span = info_span!(
        "validate",
        strict = strict,
        run_id = %config.run.run_id,
        symbol = %config.run.symbol
    )
    .entered();

    let (bars, report) = load_dataset(config, market_data)?;

    metrics::gauge!("alphapulse.validate.rows").set(report.rows as f64);
    metrics::gauge!("alphapulse.validate.duplicates").set(report.duplicates as f64);
    metrics::gauge!("alphapulse.validate.out_of_order").set(report.out_of_order as f64);
    metrics::gauge!("alphapulse.validate.invalid_rows").set(report.invalid_rows as f64);
    metrics::gauge!("alphapulse.validate.gaps").set(report.gaps as f64);

    if bars.is_empty() {
        return Err(format!("dataset {} contains no bars", config.data.ohlcv_csv));
    }
    if strict && !report.is_clean() {
        return Err("strict validation failed: data quality limits exceeded".to_string());
    }

    Ok(serde_json::json!({
        "dataset": config.data.ohlcv_csv,
        "ohlcv": data_quality_json(&report),
        "clean": report.is_clean(),
        "strict": strict,
    }))
}

fn data_quality_json(report: &DataQualityReport) -> serde_json::Value {
    serde_json::json!({
        "rows": report.rows,
        "duplicates": report.duplicates,
        "out_of_order": report.out_of_order,
        "invalid_rows": report.invalid_rows,
        "gaps": report.gaps,
        "first_timestamp": report.first_timestamp,
        "last_timestamp": report.last_timestamp,
        "max_gap_seconds": report.max_gap_seconds,
    })
}
