use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cloud::UploadError;

/// Failure kinds surfaced by an archive job.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("S3 credentials not found, check config.ini")]
    MissingCredentials,

    #[error("S3 upload error: {0}")]
    UploadService(String),

    #[error("file not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("archive job was cancelled")]
    Cancelled,

    #[error("unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl ArchiveError {
    /// Classify an I/O error raised while working on `path`.
    pub fn io(path: &Path, err: io::Error, action: &str) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            ArchiveError::PathNotFound(path.to_path_buf())
        } else {
            ArchiveError::Unexpected(anyhow::anyhow!(
                "Failed to {} {}: {}",
                action,
                path.display(),
                err
            ))
        }
    }
}

impl From<UploadError> for ArchiveError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingCredentials => ArchiveError::MissingCredentials,
            UploadError::Service(detail) => ArchiveError::UploadService(detail),
            UploadError::LocalFile { path, source } => ArchiveError::io(&path, source, "read"),
            UploadError::Other(e) => ArchiveError::Unexpected(e),
        }
    }
}
