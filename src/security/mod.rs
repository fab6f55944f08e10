//! Security utilities.
//!
//! Currently limited to credential scrubbing, which keeps access keys and
//! secrets out of status messages and log output.

pub mod credential_scrubber;

pub use credential_scrubber::{safe_error_message, scrub_credentials, scrub_secret};
