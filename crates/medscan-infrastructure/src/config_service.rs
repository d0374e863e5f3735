//! Configuration service implementation.
//!
//! Combines `config.toml`, `secret.json` and environment overrides into the
//! settings the application runs with.

use crate::paths::MedscanPaths;
use crate::secret_service::SecretService;
use medscan_core::config::MedscanConfig;
use medscan_core::error::{MedscanError, Result};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Fallback environment variable for the API key.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "MEDSCAN_MODEL";

/// Effective configuration after all sources are merged.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub config: MedscanConfig,
    api_key: Option<String>,
}

impl RuntimeConfig {
    pub fn new(config: MedscanConfig, api_key: Option<String>) -> Self {
        Self { config, api_key }
    }

    /// The API key, required only once a classifier is built.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            MedscanError::config(format!(
                "Gemini API key not configured; set {} or fill in secret.json",
                API_KEY_ENV
            ))
        })
    }
}

/// Loads configuration from the medscan config directory.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: MedscanPaths,
}

impl ConfigService {
    pub fn new(paths: MedscanPaths) -> Self {
        Self { paths }
    }

    /// Reads `config.toml`; a missing file yields the defaults.
    pub async fn load_config(&self) -> Result<MedscanConfig> {
        let path = self
            .paths
            .config_file()
            .map_err(|e| MedscanError::config(e.to_string()))?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                MedscanError::config(format!(
                    "Failed to parse config file at {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(MedscanConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Loads every source, reading overrides from the process environment.
    pub async fn load(&self) -> Result<RuntimeConfig> {
        self.load_with_env(|name| std::env::var(name).ok()).await
    }

    /// Loads every source with `env` as the environment lookup.
    ///
    /// Precedence for the API key: `GEMINI_API_KEY`, `API_KEY`, then
    /// `secret.json`. The model comes from `MEDSCAN_MODEL`, the `model_name`
    /// in `secret.json`, then `config.toml`.
    pub async fn load_with_env<F>(&self, env: F) -> Result<RuntimeConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_config().await?;

        let secret_path = self
            .paths
            .secret_file()
            .map_err(|e| MedscanError::config(e.to_string()))?;
        let secrets = SecretService::new(secret_path).load_secrets().await?;

        let (secret_key, secret_model) = secrets
            .gemini
            .map(|gemini| (Some(gemini.api_key), gemini.model_name))
            .unwrap_or_default();

        if let Some(model) = non_empty(env(MODEL_ENV)).or_else(|| non_empty(secret_model)) {
            config.classifier.model = model;
        }

        let api_key = non_empty(env(API_KEY_ENV))
            .or_else(|| non_empty(env(FALLBACK_API_KEY_ENV)))
            .or_else(|| non_empty(secret_key));

        tracing::debug!(
            model = %config.classifier.model,
            has_api_key = api_key.is_some(),
            "Configuration loaded"
        );

        Ok(RuntimeConfig::new(config, api_key))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medscan_core::config::DEFAULT_GEMINI_MODEL;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[tokio::test]
    async fn test_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(MedscanPaths::new(Some(temp_dir.path())));

        let runtime = service.load_with_env(env_of(&[])).await.unwrap();
        assert_eq!(runtime.config.classifier.model, DEFAULT_GEMINI_MODEL);
        assert!(matches!(
            runtime.require_api_key(),
            Err(MedscanError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_env_overrides_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "[classifier]\nmodel = \"gemini-from-file\"\n",
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini":{"api_key":"from-secret"}}"#,
        )
        .unwrap();
        let service = ConfigService::new(MedscanPaths::new(Some(temp_dir.path())));

        let from_files = service.load_with_env(env_of(&[])).await.unwrap();
        assert_eq!(from_files.config.classifier.model, "gemini-from-file");
        assert_eq!(from_files.require_api_key().unwrap(), "from-secret");

        let from_env = service
            .load_with_env(env_of(&[
                (MODEL_ENV, "gemini-from-env"),
                (FALLBACK_API_KEY_ENV, "fallback"),
            ]))
            .await
            .unwrap();
        assert_eq!(from_env.config.classifier.model, "gemini-from-env");
        assert_eq!(from_env.require_api_key().unwrap(), "fallback");

        let primary = service
            .load_with_env(env_of(&[
                (API_KEY_ENV, "primary"),
                (FALLBACK_API_KEY_ENV, "fallback"),
            ]))
            .await
            .unwrap();
        assert_eq!(primary.require_api_key().unwrap(), "primary");
    }

    #[tokio::test]
    async fn test_secret_model_name_overrides_config_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "[classifier]\nmodel = \"gemini-from-file\"\n",
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini":{"api_key":"k","model_name":"gemini-from-secret"}}"#,
        )
        .unwrap();
        let service = ConfigService::new(MedscanPaths::new(Some(temp_dir.path())));

        let runtime = service.load_with_env(env_of(&[])).await.unwrap();
        assert_eq!(runtime.config.classifier.model, "gemini-from-secret");

        let runtime = service
            .load_with_env(env_of(&[(MODEL_ENV, "gemini-from-env")]))
            .await
            .unwrap();
        assert_eq!(runtime.config.classifier.model, "gemini-from-env");
    }

    #[tokio::test]
    async fn test_blank_secret_key_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MedscanPaths::new(Some(temp_dir.path()));
        SecretService::new(paths.secret_file().unwrap())
            .ensure_secret_file()
            .unwrap();

        let runtime = ConfigService::new(paths)
            .load_with_env(env_of(&[]))
            .await
            .unwrap();
        assert!(runtime.require_api_key().is_err());
    }

    #[tokio::test]
    async fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "[classifier\n").unwrap();
        let service = ConfigService::new(MedscanPaths::new(Some(temp_dir.path())));

        let err = service.load_config().await.unwrap_err();
        assert!(matches!(err, MedscanError::Config(_)));
    }
}
