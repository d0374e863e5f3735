//! Secret service implementation.
//!
//! Loads API keys from `secret.json`, creating a template the first time.

use medscan_core::config::{DEFAULT_GEMINI_MODEL, GeminiConfig, SecretConfig};
use medscan_core::error::{MedscanError, Result};
use std::path::{Path, PathBuf};

/// Reads `secret.json`.
///
/// Secrets are never logged; error messages only mention the file path.
#[derive(Debug, Clone)]
pub struct SecretService {
    path: PathBuf,
}

impl SecretService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn secret_file_exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the secret configuration. A missing file yields an empty one.
    pub async fn load_secrets(&self) -> Result<SecretConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SecretConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            MedscanError::config(format!(
                "Failed to parse secret file at {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Ensures the secret file exists, creating it with a template if it doesn't.
    ///
    /// # Security Note
    ///
    /// Sets file permissions to 600 (user read/write only) on Unix systems.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        if self.path.exists() {
            return Ok(self.path.clone());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_GEMINI_MODEL.to_string()),
            }),
        };
        let template_json = serde_json::to_string_pretty(&template)?;
        std::fs::write(&self.path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        tracing::info!(path = %self.path.display(), "Created secret file template");
        Ok(self.path.clone())
    }
}
