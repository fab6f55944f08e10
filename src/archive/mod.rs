//! The copy, compress and upload pipeline.
//!
//! An archive job runs three stages in order:
//!
//! 1. **Copy**: every entry of the source library is copied into the
//!    destination directory, which is created if needed.
//! 2. **Compress**: the destination directory is zipped into
//!    `<leaf>.zip` inside the configured temporary directory, with all
//!    entries under a single `<leaf>/` folder.
//! 3. **Upload**: the archive is uploaded to the bucket under its file name
//!    with the configured storage class.
//!
//! Progress is reported through a [`StatusSink`]. Callers that need to stay
//! responsive use [`spawn`] and iterate the returned [`JobHandle`].
//!
//! ```no_run
//! use music_archiver::archive::{spawn, ArchivePipeline, JobEvent};
//! use music_archiver::cloud::S3Store;
//! use music_archiver::config::ConfigStore;
//! use music_archiver::models::ArchiveJob;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut config = ConfigStore::at_default_location();
//! config.load();
//!
//! let pipeline = ArchivePipeline::new(config.snapshot(), S3Store::new());
//! let job = ArchiveJob::new("/music", "/backup/2024", "my-bucket");
//!
//! for event in spawn(pipeline, job)? {
//!     match event {
//!         JobEvent::Status(status) => println!("{}", status),
//!         JobEvent::Finished(outcome) => println!("done: {}", outcome.message),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod cancel;
pub mod compress;
pub mod copy;
mod error;
mod job;
mod pipeline;
mod status;

pub use cancel::CancelToken;
pub use error::ArchiveError;
pub use job::{spawn, JobEvent, JobHandle};
pub use pipeline::ArchivePipeline;
pub use status::{StatusEvent, StatusSink};
