use std::time::Instant;

use anyhow::{anyhow, Context};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use rusoto_core::{ByteStream, RusotoError};
use rusoto_s3::{PutObjectError, PutObjectRequest, S3Client, S3};
use tokio::runtime::Runtime;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::cloud::client::create_s3_client;
use crate::cloud::{ObjectStore, UploadError, UploadRequest};
use crate::config::Settings;
use crate::constants::UPLOAD_READ_BUFFER_SIZE;
use crate::security::scrub_secret;

/// [`ObjectStore`] backed by Amazon S3.
///
/// Each upload builds a fresh client from the settings it is given, so
/// credentials edited between runs take effect without a restart. The
/// archive is sent with a single `PutObject` whose body is streamed from
/// disk; there is no multipart upload and no retry.
#[derive(Debug, Clone, Default)]
pub struct S3Store;

impl S3Store {
    pub fn new() -> Self {
        S3Store
    }

    async fn put_archive(
        &self,
        client: &S3Client,
        settings: &Settings,
        request: &UploadRequest,
    ) -> Result<(), UploadError> {
        let local_file = |source| UploadError::LocalFile {
            path: request.local_path.clone(),
            source,
        };

        let file = tokio::fs::File::open(&request.local_path).await.map_err(local_file)?;
        let size = file.metadata().await.map_err(local_file)?.len();

        let content_len = body_size(size)?;

        let stream = FramedRead::with_capacity(file, BytesCodec::new(), UPLOAD_READ_BUFFER_SIZE)
            .map_ok(BytesMut::freeze);

        let put = PutObjectRequest {
            bucket: request.bucket.clone(),
            key: request.key.clone(),
            body: Some(ByteStream::new_with_size(stream, content_len)),
            content_length: Some(size as i64),
            storage_class: Some(request.storage_class.clone()),
            ..Default::default()
        };

        debug!(
            "Uploading {} ({} bytes) to s3://{}/{}",
            request.local_path.display(),
            size,
            request.bucket,
            request.key
        );

        client
            .put_object(put)
            .await
            .map_err(|e| map_put_error(e, &settings.secret_access_key))?;
        Ok(())
    }
}

impl ObjectStore for S3Store {
    fn upload(&self, settings: &Settings, request: &UploadRequest) -> Result<(), UploadError> {
        let client = create_s3_client(settings)?;
        let runtime = Runtime::new().context("Failed to create Tokio runtime")?;
        let start_time = Instant::now();

        runtime.block_on(self.put_archive(&client, settings, request))?;

        info!(
            "Uploaded {} to s3://{}/{} ({}) in {:?}",
            request.local_path.display(),
            request.bucket,
            request.key,
            request.storage_class,
            start_time.elapsed()
        );
        Ok(())
    }
}

/// Archive size as a body length; fails when it does not fit the platform's `usize`.
fn body_size(size: u64) -> Result<usize, UploadError> {
    usize::try_from(size)
        .map_err(|_| UploadError::Other(anyhow!("Archive of {} bytes is too large to upload on this platform", size)))
}

/// Split provider failures into missing credentials and service errors.
///
/// Service detail is scrubbed so neither the access key nor `secret` can
/// leak into status messages.
fn map_put_error(err: RusotoError<PutObjectError>, secret: &str) -> UploadError {
    match err {
        RusotoError::Credentials(e) => {
            warn!("S3 credentials rejected: {}", scrub_secret(&e.to_string(), secret));
            UploadError::MissingCredentials
        }
        other => UploadError::Service(scrub_secret(&other.to_string(), secret)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use rusoto_credential::CredentialsError;
    use tempfile::TempDir;

    use crate::test_utils::test_settings;

    fn request(local_path: PathBuf) -> UploadRequest {
        UploadRequest {
            local_path,
            bucket: "test-bucket".to_string(),
            key: "2024.zip".to_string(),
            storage_class: "DEEP_ARCHIVE".to_string(),
        }
    }

    #[test]
    fn test_map_credentials_error() {
        let err = RusotoError::Credentials(CredentialsError::new("no credentials"));
        assert!(matches!(map_put_error(err, "secret"), UploadError::MissingCredentials));
    }

    #[test]
    fn test_map_service_error_scrubs_secret() {
        let err = RusotoError::Validation("signature mismatch for s3cr3t-value".to_string());
        match map_put_error(err, "s3cr3t-value") {
            UploadError::Service(detail) => {
                assert!(detail.contains("signature mismatch"));
                assert!(!detail.contains("s3cr3t-value"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_body_size() {
        assert_eq!(body_size(1024).unwrap(), 1024);

        if usize::BITS < 64 {
            assert!(matches!(body_size(u64::MAX), Err(UploadError::Other(_))));
        } else {
            assert_eq!(body_size(1 << 33).unwrap() as u64, 1u64 << 33);
        }
    }

    #[test]
    fn test_upload_without_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let result = S3Store::new().upload(
            &crate::config::Settings::default(),
            &request(temp_dir.path().join("2024.zip")),
        );
        assert!(matches!(result, Err(UploadError::MissingCredentials)));
    }

    #[test]
    fn test_upload_missing_archive() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.zip");

        let result = S3Store::new().upload(&test_settings(temp_dir.path()), &request(missing.clone()));

        match result {
            Err(UploadError::LocalFile { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
