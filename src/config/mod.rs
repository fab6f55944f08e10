//! Settings persistence.
//!
//! Credentials and archive defaults live in an INI file, by default
//! `~/.MusicArchiver/config.ini`. [`ConfigStore`] loads and saves that file
//! and hands out immutable [`Settings`] snapshots.

use std::env;
use std::path::PathBuf;

mod settings;
mod store;

pub use settings::Settings;
pub use store::{ConfigStore, InvalidReason, LoadState};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV_VAR};

/// Location of the settings file.
///
/// `MUSIC_ARCHIVER_CONFIG` wins when set; otherwise the file lives in
/// `.MusicArchiver` under the home directory, or under the working directory
/// when no home directory can be determined.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV_VAR).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}
