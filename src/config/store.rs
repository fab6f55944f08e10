use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ini::{EscapePolicy, Ini, ParseOption};
use log::{debug, error, info, warn};

use crate::config::settings::Settings;
use crate::config::default_config_path;

/// Why the last `load()` did not produce usable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    MissingFile,
    MissingFields,
    ParseError,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingFile => write!(f, "settings file not found"),
            InvalidReason::MissingFields => write!(f, "access key id or secret access key missing"),
            InvalidReason::ParseError => write!(f, "settings file could not be read"),
        }
    }
}

/// Load state of a [`ConfigStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Valid,
    Invalid(InvalidReason),
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Unloaded => write!(f, "not loaded"),
            LoadState::Valid => write!(f, "loaded"),
            LoadState::Invalid(reason) => write!(f, "invalid ({})", reason),
        }
    }
}

/// Persisted holder of credentials and archive defaults.
///
/// The store owns the current [`Settings`] snapshot. Callers take a clone
/// with [`ConfigStore::snapshot`] and pass it into the pipeline; reloading
/// replaces the store's copy without touching snapshots already handed out.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    settings: Option<Settings>,
    state: LoadState,
}

impl ConfigStore {
    /// Create an unloaded store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore {
            path: path.into(),
            settings: None,
            state: LoadState::Unloaded,
        }
    }

    /// Create an unloaded store at the per-user default location.
    pub fn at_default_location() -> Self {
        Self::new(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The last load or save produced settings with both credentials.
    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Valid
    }

    /// Settings read by the last load or written by the last save, if any.
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// Clone of the current settings, or defaults when nothing was loaded.
    pub fn snapshot(&self) -> Settings {
        self.settings.clone().unwrap_or_default()
    }

    /// Re-read the settings file.
    ///
    /// Returns `false` when the file is absent or unreadable (the previous
    /// snapshot is kept) or when either credential is missing (the parsed
    /// snapshot replaces the previous one). Safe to call before every run.
    pub fn load(&mut self) -> bool {
        if !self.path.exists() {
            debug!("Settings file {} does not exist", self.path.display());
            self.state = LoadState::Invalid(InvalidReason::MissingFile);
            return false;
        }

        let ini = match Ini::load_from_file_opt(&self.path, parse_options()) {
            Ok(ini) => ini,
            Err(e) => {
                warn!("Failed to read settings from {}: {}", self.path.display(), e);
                self.state = LoadState::Invalid(InvalidReason::ParseError);
                return false;
            }
        };

        let settings = Settings::from_ini(&ini);
        let valid = settings.has_credentials();
        self.settings = Some(settings);

        if valid {
            debug!("Loaded settings from {}", self.path.display());
            self.state = LoadState::Valid;
            true
        } else {
            warn!("Settings in {} lack credentials", self.path.display());
            self.state = LoadState::Invalid(InvalidReason::MissingFields);
            false
        }
    }

    /// Persist `settings` and make them current.
    ///
    /// The file is written next to its final location and renamed into
    /// place, so on failure both the file and the in-memory snapshot keep
    /// their previous contents.
    pub fn save(&mut self, settings: Settings) -> bool {
        match self.write(&settings) {
            Ok(()) => {
                info!("Saved settings to {}", self.path.display());
                self.state = if settings.has_credentials() {
                    LoadState::Valid
                } else {
                    LoadState::Invalid(InvalidReason::MissingFields)
                };
                self.settings = Some(settings);
                true
            }
            Err(e) => {
                error!("Failed to save settings: {:#}", e);
                false
            }
        }
    }

    fn write(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create settings directory {}", parent.display()))?;
        }

        let staging = self.path.with_extension("ini.tmp");
        settings
            .to_ini()
            .write_to_file_policy(&staging, EscapePolicy::Nothing)
            .context(format!("Failed to write {}", staging.display()))?;
        restrict_permissions(&staging)?;

        fs::rename(&staging, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            anyhow::anyhow!("Failed to move settings into {}: {}", self.path.display(), e)
        })?;
        Ok(())
    }
}

fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .context(format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
