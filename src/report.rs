use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::ChecksumError;
use crate::models::{Algorithm, ChecksumResult, JobOutcome};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecksumReport {
    pub id: String,
    pub file_name: String,
    pub file_path: PathBuf,
    pub file_size: Option<u64>,
    pub status: ReportStatus,
    pub checksums: ChecksumResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<Algorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ChecksumReport {
    pub fn from_outcome(path: &Path, outcome: &JobOutcome, expected: Option<String>) -> Self {
        let (status, error) = match outcome {
            JobOutcome::Completed(_) => (ReportStatus::Completed, None),
            JobOutcome::Cancelled(_) => (ReportStatus::Cancelled, None),
            JobOutcome::Failed { stage, cause, .. } => (
                ReportStatus::Failed,
                Some(format!("{} stage: {}", stage.id(), cause)),
            ),
        };
        let checksums = outcome.result().clone();
        let matched = expected
            .as_deref()
            .and_then(|e| utils::find_match(&checksums, e));
        ChecksumReport {
            id: Uuid::new_v4().to_string(),
            file_name: path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("file")
                .to_string(),
            file_path: path.to_path_buf(),
            file_size: fs::metadata(path).ok().map(|m| m.len()),
            status,
            checksums,
            expected,
            matched,
            error,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, ChecksumError> {
        serde_json::to_string_pretty(self).map_err(|e| ChecksumError::Report {
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ChecksumError> {
        let s = self.to_json()?;
        fs::write(path, s).map_err(|e| ChecksumError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
