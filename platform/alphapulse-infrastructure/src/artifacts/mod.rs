use alphapulse_domain::repositories::artifacts::ArtifactWriter;
use alphapulse_domain::services::rollout::{EpisodeSummary, Transition};
use std::fs;
use std::io::Write;
use std::path::Path;

pub const TRAJECTORY_HEADER: [&str; 18] = [
    "step",
    "timestamp",
    "action",
    "reference_price",
    "execution_price",
    "quantity",
    "fee",
    "slippage_cost",
    "balance",
    "position",
    "equity",
    "peak_equity",
    "pnl",
    "cost",
    "volatility_penalty",
    "drawdown_penalty",
    "reward",
    "terminated",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactWriter;

impl FilesystemArtifactWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactWriter for FilesystemArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        fs::create_dir_all(path)
            .map_err(|err| format!("failed to create dir {}: {}", path.display(), err))
    }

    fn write_trajectory_csv(&self, path: &Path, transitions: &[Transition]) -> Result<(), String> {
        let mut wtr = csv::Writer::from_path(path).map_err(|err| {
            format!("failed to create trajectory csv {}: {}", path.display(), err)
        })?;
        wtr.write_record(TRAJECTORY_HEADER)
            .map_err(|err| format!("failed to write trajectory csv header: {}", err))?;

        for t in transitions {
            let info = &t.info;
            wtr.write_record([
                info.step_index.to_string(),
                t.timestamp.to_string(),
                info.action.label().to_string(),
                info.reference_price.to_string(),
                info.execution_price.to_string(),
                info.quantity.to_string(),
                info.fee.to_string(),
                info.slippage_cost.to_string(),
                info.balance.to_string(),
                info.position.to_string(),
                info.equity.to_string(),
                info.peak_equity.to_string(),
                info.reward.pnl.to_string(),
                info.reward.cost.to_string(),
                info.reward.volatility_penalty.to_string(),
                info.reward.drawdown_penalty.to_string(),
                t.reward.to_string(),
                t.terminated.to_string(),
            ])
            .map_err(|err| format!("failed to write trajectory row: {}", err))?;
        }

        wtr.flush()
            .map_err(|err| format!("failed to flush trajectory csv: {}", err))
    }

    fn write_summary_json(
        &self,
        path: &Path,
        summary: &EpisodeSummary,
        meta: &serde_json::Value,
    ) -> Result<(), String> {
        let json = serde_json::json!({
            "meta": meta,
            "summary": summary,
        });
        let json = serde_json::to_string_pretty(&json)
            .map_err(|err| format!("failed to serialize summary: {}", err))?;
        let mut file =
            fs::File::create(path).map_err(|err| format!("failed to create summary: {}", err))?;
        file.write_all(json.as_bytes())
            .map_err(|err| format!("failed to write summary {}: {}", path.display(), err))
    }

    fn write_config_snapshot_toml(&self, path: &Path, contents: &str) -> Result<(), String> {
        fs::write(path, contents).map_err(|err| {
            format!(
                "failed to write config snapshot {}: {}",
                path.display(),
                err
            )
        })
    }
}
