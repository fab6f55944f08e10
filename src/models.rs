use std::path::PathBuf;

use serde::{Serialize, Deserialize};

/// One copy, compress and upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub bucket: String,
}

impl ArchiveJob {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
        bucket: impl Into<String>,
    ) -> Self {
        ArchiveJob {
            source_dir: source_dir.into(),
            destination_dir: destination_dir.into(),
            bucket: bucket.into(),
        }
    }
}

/// Terminal result of a job: exactly one per run.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub success: bool,
    pub message: String,
    pub report: Option<JobReport>,
}

impl JobOutcome {
    pub fn succeeded(message: String, report: JobReport) -> Self {
        JobOutcome { success: true, message, report: Some(report) }
    }

    pub fn failed(message: String) -> Self {
        JobOutcome { success: false, message, report: None }
    }
}

/// Summary of a completed job, printed by the CLI with `--json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub source_dir: String,
    pub destination_dir: String,
    pub bucket: String,
    pub object_key: String,
    pub storage_class: String,
    pub archive_path: String,
    pub archive_size: u64,
    pub files_copied: u64,
    pub started_at: String,
    pub finished_at: String,
}
