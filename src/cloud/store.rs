use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::Settings;

/// A single object upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub local_path: PathBuf,
    pub bucket: String,
    pub key: String,
    pub storage_class: String,
}

/// Failure kinds reported by an [`ObjectStore`].
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no storage credentials available")]
    MissingCredentials,

    #[error("{0}")]
    Service(String),

    #[error("cannot read {}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Destination for finished archives.
///
/// Implementations authenticate with the credentials in `settings` and make
/// exactly one attempt per call.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore: Send + Sync {
    fn upload(&self, settings: &Settings, request: &UploadRequest) -> Result<(), UploadError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn upload(&self, settings: &Settings, request: &UploadRequest) -> Result<(), UploadError> {
        (**self).upload(settings, request)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn upload(&self, settings: &Settings, request: &UploadRequest) -> Result<(), UploadError> {
        (**self).upload(settings, request)
    }
}
