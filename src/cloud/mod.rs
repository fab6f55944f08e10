//! Cloud storage integration for archive uploads.
//!
//! The pipeline talks to storage through the [`ObjectStore`] trait so the
//! provider can be swapped out in tests. [`S3Store`] is the production
//! implementation: it authenticates with the static credentials from the
//! settings file, scopes the client to the configured region and uploads
//! each archive with a single `PutObject`, tagging it with the configured
//! storage class.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use music_archiver::cloud::{ObjectStore, S3Store, UploadRequest};
//! use music_archiver::config::ConfigStore;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut store = ConfigStore::at_default_location();
//! store.load();
//! let settings = store.snapshot();
//!
//! S3Store::new().upload(&settings, &UploadRequest {
//!     local_path: PathBuf::from("/tmp/2024.zip"),
//!     bucket: "my-bucket".to_string(),
//!     key: "2024.zip".to_string(),
//!     storage_class: settings.storage_class.clone(),
//! })?;
//! # Ok(())
//! # }
//! ```

/// S3 client construction
pub mod client;

/// Amazon S3 upload implementation
pub mod s3;

/// Storage abstraction shared by all providers
mod store;

pub use s3::S3Store;
pub use store::{ObjectStore, UploadError, UploadRequest};

#[cfg(test)]
pub use store::MockObjectStore;
