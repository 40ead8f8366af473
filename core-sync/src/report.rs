use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// An asset the run could not bring into the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of one media sync run.
///
/// `success` means the schedule was fetched and every asset was visited;
/// individual failures are counted in `failed` and listed in `failures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub downloaded: u32,
    pub skipped: u32,
    pub failed: u32,
    pub failures: Vec<AssetFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn begin(started_at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
            started_at,
            finished_at: started_at,
        }
    }

    pub(crate) fn record_failure(&mut self, path: &str, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(AssetFailure {
            path: path.to_string(),
            reason: reason.into(),
        });
    }

    /// Assets visited by the run.
    pub fn total(&self) -> u32 {
        self.downloaded + self.skipped + self.failed
    }

    /// Every asset is present locally.
    pub fn is_complete(&self) -> bool {
        self.success && self.failed == 0
    }

    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// One-line summary for status displays.
    pub fn message(&self) -> String {
        format!(
            "Downloaded: {}, Skipped: {}, Errors: {}",
            self.downloaded, self.skipped, self.failed
        )
    }
}
