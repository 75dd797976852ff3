use crate::services::rollout::{EpisodeSummary, Transition};
use std::path::Path;

pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String>;
    fn write_trajectory_csv(&self, path: &Path, transitions: &[Transition]) -> Result<(), String>;
    fn write_summary_json(
        &self,
        path: &Path,
        summary: &EpisodeSummary,
        meta: &serde_json::Value,
    ) -> Result<(), String>;
    fn write_config_snapshot_toml(&self, path: &Path, contents: &str) -> Result<(), String>;
}
