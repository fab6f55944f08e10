//! # music-archiver
//!
//! Copies a music library to a destination directory, zips the destination
//! and uploads the archive to an S3 bucket.
//!
//! ## Overview
//!
//! A run is a linear, single-attempt pipeline:
//!
//! - **Copy**: the library's entries are copied into the destination,
//!   keeping permissions and timestamps and never following links
//! - **Compress**: the destination becomes `<leaf>.zip` in the configured
//!   temporary directory
//! - **Upload**: the archive is put into the bucket with the configured
//!   storage class (`DEEP_ARCHIVE` by default)
//!
//! Credentials and defaults come from `~/.MusicArchiver/config.ini`.
//!
//! ## Usage
//!
//! ```no_run
//! use music_archiver::archive::{ArchivePipeline, StatusEvent};
//! use music_archiver::cloud::S3Store;
//! use music_archiver::config::ConfigStore;
//! use music_archiver::models::ArchiveJob;
//!
//! let mut config = ConfigStore::at_default_location();
//! if !config.load() {
//!     eprintln!("settings unusable: {}", config.state());
//! }
//!
//! let pipeline = ArchivePipeline::new(config.snapshot(), S3Store::new());
//! let outcome = pipeline.run(
//!     &ArchiveJob::new("/music", "/backup/2024", "my-bucket"),
//!     &|event: StatusEvent| println!("{}", event),
//! );
//! println!("{}: {}", outcome.success, outcome.message);
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`models`]: Job request, outcome and report types
//! - [`archive`]: The copy, compress and upload pipeline
//! - [`cloud`]: Object storage (S3)
//! - [`config`]: Settings file loading and saving
//! - [`security`]: Credential scrubbing
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Copy, compress and upload pipeline
pub mod archive;

/// Cloud storage integration (S3)
pub mod cloud;

/// Settings persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Security utilities for credential protection
pub mod security;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
