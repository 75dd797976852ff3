use crate::services::ohlcv::DataQualityReport;
use crate::value_objects::bar::Bar;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BarQuery {
    pub path: PathBuf,
    pub symbol: String,
    pub expected_step_seconds: Option<i64>,
}

pub trait BarRepository {
    fn load_bars(&self, query: &BarQuery) -> Result<(Vec<Bar>, DataQualityReport), String>;
}
