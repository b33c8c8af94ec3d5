//! Layered settings: built-in defaults, then a TOML file, then `PREPDESK_*`
//! environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat, Map};
use prepdesk_domain::ClientSettings;
use thiserror::Error;
use tracing::debug;

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "prepdesk";
/// Settings file name looked up in [`APP_DIR`].
pub const CONFIG_FILE_NAME: &str = "prepdesk.toml";
/// Session file name used when no storage path is configured.
pub const SESSION_FILE_NAME: &str = "session.json";
/// Prefix of environment overrides, e.g. `PREPDESK_BASE_URL`.
pub const ENV_PREFIX: &str = "PREPDESK";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or merged.
    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    /// No storage path was configured and the platform has no config directory.
    #[error("no config directory available; set PREPDESK_STORAGE_PATH")]
    NoConfigDir,
}

/// Builds [`ClientSettings`] from layered sources.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env: Option<Map<String, String>>,
}

impl SettingsLoader {
    /// Creates a loader reading the default config file and the process
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads this file instead of the default one. The file must exist.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Replaces the process environment with the given variables.
    #[must_use]
    pub fn with_env(mut self, vars: Map<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Returns `<config dir>/prepdesk/prepdesk.toml`.
    #[must_use]
    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
    }

    /// Loads and merges every source.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Config` if the explicit file is missing, a
    /// file does not parse, or a value has the wrong type.
    pub fn load(&self) -> Result<ClientSettings, SettingsError> {
        let mut builder = Config::builder();

        match (&self.file, Self::default_config_file()) {
            (Some(path), _) => {
                debug!(path = %path.display(), "loading settings file");
                builder = builder.add_source(toml_file(path, true));
            }
            (None, Some(path)) => {
                builder = builder.add_source(toml_file(&path, false));
            }
            (None, None) => {}
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(self.env.clone()),
        );

        let settings: ClientSettings = builder.build()?.try_deserialize()?;
        debug!(base_url = %settings.base_url, "settings loaded");
        Ok(settings)
    }

    /// Returns the configured storage path, or `<config dir>/prepdesk/session.json`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NoConfigDir` when neither is available.
    pub fn storage_path(settings: &ClientSettings) -> Result<PathBuf, SettingsError> {
        if let Some(path) = &settings.storage_path {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(SESSION_FILE_NAME))
            .ok_or(SettingsError::NoConfigDir)
    }
}

fn toml_file(path: &Path, required: bool) -> impl config::Source + Send + Sync + use<> {
    File::from(path).format(FileFormat::Toml).required(required)
}
