//! Unified path management for medscan configuration and data files.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "medscan";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for medscan.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/medscan/           # Config directory
/// ├── config.toml              # Application configuration
/// ├── secret.json              # API keys
/// └── logs/                    # Application logs
///     └── medscan.log.YYYY-MM-DD
///
/// ~/.local/share/medscan/      # Data directory
/// └── store/                   # Local persistent store (one file per key)
///     ├── theme.json
///     └── predictionHistory.json
/// ```
///
/// With a base path (tests, `--data-dir`) both directories collapse to it.
#[derive(Debug, Clone, Default)]
pub struct MedscanPaths {
    base: Option<PathBuf>,
}

impl MedscanPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// The file is created with 600 permissions on Unix; keep it that way.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
