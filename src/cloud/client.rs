use anyhow::anyhow;
use log::{debug, warn};
use rusoto_core::{HttpClient, Region};
use rusoto_credential::StaticProvider;
use rusoto_s3::S3Client;

use crate::cloud::UploadError;
use crate::config::Settings;
use crate::security::safe_error_message;

/// Parse a region name, falling back to the environment's default region.
pub fn parse_region(name: &str) -> Region {
    match name.parse::<Region>() {
        Ok(region) => region,
        Err(_) => {
            warn!("Invalid region '{}', using default", name);
            Region::default()
        }
    }
}

/// Create a region-scoped S3 client authenticated with the static
/// credentials in `settings`.
pub fn create_s3_client(settings: &Settings) -> Result<S3Client, UploadError> {
    if !settings.has_credentials() {
        return Err(UploadError::MissingCredentials);
    }

    let region = parse_region(&settings.region);
    let provider = StaticProvider::new_minimal(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
    );
    let http_client = HttpClient::new()
        .map_err(|e| UploadError::Other(anyhow!(safe_error_message("Failed to create HTTP client", &e))))?;

    debug!("Created S3 client for region {}", region.name());
    Ok(S3Client::new_with(http_client, provider, region))
}
