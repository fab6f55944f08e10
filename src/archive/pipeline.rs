use std::fs;
use std::time::Instant;

use chrono::Utc;
use log::{error, info};

use crate::archive::cancel::CancelToken;
use crate::archive::compress::{archive_root_name, compress_directory};
use crate::archive::copy::copy_library;
use crate::archive::error::ArchiveError;
use crate::archive::status::{StatusEvent, StatusSink};
use crate::cloud::{ObjectStore, UploadRequest};
use crate::config::Settings;
use crate::models::{ArchiveJob, JobOutcome, JobReport};
use crate::security::scrub_secret;

/// Copy, compress and upload pipeline.
///
/// A pipeline owns one settings snapshot and one object store. Each call to
/// [`run`](ArchivePipeline::run) executes a job end to end with at most one
/// attempt per stage; nothing is rolled back when a later stage fails.
pub struct ArchivePipeline<S: ObjectStore> {
    settings: Settings,
    store: S,
    cancel: CancelToken,
}

impl<S: ObjectStore> ArchivePipeline<S> {
    pub fn new(settings: Settings, store: S) -> Self {
        ArchivePipeline {
            settings,
            store,
            cancel: CancelToken::new(),
        }
    }

    /// Use `token` to stop the job between stages or files.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run `job` and fold the result into a single outcome.
    ///
    /// On failure the error message is emitted once as
    /// [`StatusEvent::Failed`] before being returned. This never panics on
    /// job errors and always yields exactly one outcome.
    pub fn run(&self, job: &ArchiveJob, sink: &dyn StatusSink) -> JobOutcome {
        match self.execute(job, sink) {
            Ok(report) => {
                let message = StatusEvent::UploadFinished {
                    archive_name: report.object_key.clone(),
                    bucket: report.bucket.clone(),
                }
                .to_string();
                JobOutcome::succeeded(message, report)
            }
            Err(e) => {
                let message = scrub_secret(&e.to_string(), &self.settings.secret_access_key);
                error!("Archive job failed: {}", message);
                sink.emit(StatusEvent::Failed { message: message.clone() });
                JobOutcome::failed(message)
            }
        }
    }

    /// Run `job`, returning the first error unchanged.
    pub fn execute(&self, job: &ArchiveJob, sink: &dyn StatusSink) -> Result<JobReport, ArchiveError> {
        let start = Instant::now();
        let started_at = Utc::now().to_rfc3339();
        info!(
            "Archiving {} via {} to bucket {}",
            job.source_dir.display(),
            job.destination_dir.display(),
            job.bucket
        );

        // Stage 1: copy
        self.cancel.check()?;
        sink.emit(StatusEvent::CopyStarted);
        let files_copied = copy_library(&job.source_dir, &job.destination_dir, &self.cancel)?;
        sink.emit(StatusEvent::CopyFinished);

        // Stage 2: compress
        self.cancel.check()?;
        sink.emit(StatusEvent::CompressStarted);
        let archive_name = format!("{}.zip", archive_root_name(&job.destination_dir)?);
        let archive_path = compress_directory(
            &job.destination_dir,
            &self.settings.archive_temp_dir,
            &self.cancel,
        )?;
        sink.emit(StatusEvent::CompressFinished { archive_name: archive_name.clone() });

        // Stage 3: upload
        self.cancel.check()?;
        sink.emit(StatusEvent::UploadStarted);
        if !self.settings.has_credentials() {
            return Err(ArchiveError::MissingCredentials);
        }
        if !archive_path.exists() {
            return Err(ArchiveError::PathNotFound(archive_path));
        }
        let archive_size = fs::metadata(&archive_path)
            .map_err(|e| ArchiveError::io(&archive_path, e, "inspect"))?
            .len();

        let request = UploadRequest {
            local_path: archive_path.clone(),
            bucket: job.bucket.clone(),
            key: archive_name.clone(),
            storage_class: self.settings.storage_class.clone(),
        };
        self.store.upload(&self.settings, &request)?;
        sink.emit(StatusEvent::UploadFinished {
            archive_name: archive_name.clone(),
            bucket: job.bucket.clone(),
        });

        info!("Archive job completed in {:?}", start.elapsed());
        Ok(JobReport {
            source_dir: job.source_dir.display().to_string(),
            destination_dir: job.destination_dir.display().to_string(),
            bucket: job.bucket.clone(),
            object_key: archive_name,
            storage_class: request.storage_class,
            archive_path: archive_path.display().to_string(),
            archive_size,
            files_copied,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        })
    }
}
