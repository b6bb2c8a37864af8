use crate::cli::CommonArgs;
use crate::error::{ContribError, Result};
use crate::model::Window;
use crate::readme::Markers;
use crate::util::{parse_day, today_utc};
use std::path::PathBuf;

pub const SNAPSHOT_FILE: &str = "contributions.json";
pub const SUMMARY_FILE: &str = "summary.md";

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub window: Window,
    pub readme: PathBuf,
    pub assets_dir: PathBuf,
    pub data_dir: PathBuf,
    pub markers: Markers,
    pub dry_run: bool,
}

impl RunConfig {
    pub fn from_args(common: &CommonArgs) -> Result<Self> {
        let today = match common.today.as_deref() {
            Some(day) => parse_day(day)?,
            None => today_utc(),
        };
        let window = Window::trailing(today, common.window_days).ok_or_else(|| {
            ContribError::Config(format!(
                "Window must be between 1 and {} days, got {}",
                Window::MAX_DAYS,
                common.window_days
            ))
        })?;

        if common.start_marker.trim().is_empty() || common.end_marker.trim().is_empty() {
            return Err(ContribError::Config("Markers must not be empty".to_string()));
        }
        if common.start_marker.trim() == common.end_marker.trim() {
            return Err(ContribError::Config(
                "Start and end markers must differ".to_string(),
            ));
        }

        Ok(Self {
            window,
            readme: common.readme.clone(),
            assets_dir: common.assets_dir.clone(),
            data_dir: common.data_dir.clone(),
            markers: Markers {
                start: common.start_marker.trim().to_string(),
                end: common.end_marker.trim().to_string(),
            },
            dry_run: common.dry_run,
        })
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.data_dir.join(SUMMARY_FILE)
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.assets_dir.join(file_name)
    }
}
