//! Wires configuration, storage and the classifier into a controller.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use medscan_application::PredictionController;
use medscan_core::classification::{ClassificationResult, Classifier};
use medscan_core::error::MedscanError;
use medscan_core::image::ImageMimeType;
use medscan_core::store::{KeyValueStore, MemoryKeyValueStore};
use medscan_infrastructure::{
    ConfigService, FileKeyValueStore, MedscanPaths, RuntimeConfig, SecretService,
};
use medscan_interaction::{GeminiClassifier, TimeoutClassifier};

/// Stands in for the remote client when no API key is configured, so that
/// history and theme commands keep working.
struct UnconfiguredClassifier {
    reason: MedscanError,
}

#[async_trait]
impl Classifier for UnconfiguredClassifier {
    async fn classify(
        &self,
        _image_bytes: &[u8],
        _mime_type: ImageMimeType,
    ) -> medscan_core::Result<ClassificationResult> {
        Err(self.reason.clone())
    }
}

pub struct Bootstrap {
    pub paths: MedscanPaths,
    pub runtime: RuntimeConfig,
}

impl Bootstrap {
    pub async fn load(paths: MedscanPaths) -> Result<Self> {
        let runtime = ConfigService::new(paths.clone())
            .load()
            .await
            .context("Failed to load configuration")?;
        Ok(Self { paths, runtime })
    }

    /// Builds the store: in memory when `ephemeral`, otherwise on disk.
    pub fn store(&self, ephemeral: bool) -> Result<Arc<dyn KeyValueStore>> {
        if ephemeral {
            tracing::info!("Using an ephemeral in-memory store");
            return Ok(Arc::new(MemoryKeyValueStore::new()));
        }

        let dir = self.paths.store_dir().context("Failed to locate the data directory")?;
        Ok(Arc::new(
            FileKeyValueStore::new(dir)
                .with_max_value_bytes(self.runtime.config.storage.max_value_bytes),
        ))
    }

    /// Builds the Gemini client behind the configured timeout.
    ///
    /// When no API key is configured and `required` is set, a secret file
    /// template is created and the error points at it.
    pub fn classifier(&self, required: bool) -> Result<Arc<dyn Classifier>> {
        match GeminiClassifier::from_config(&self.runtime) {
            Ok(client) => {
                let timeout = self.runtime.config.classifier.timeout();
                Ok(Arc::new(TimeoutClassifier::new(client, timeout)))
            }
            Err(reason) if required => {
                let secret_path = self
                    .paths
                    .secret_file()
                    .context("Failed to locate the config directory")?;
                let created = SecretService::new(secret_path).ensure_secret_file()?;
                anyhow::bail!("{reason}\nAdd your key to {}", created.display())
            }
            Err(reason) => Ok(Arc::new(UnconfiguredClassifier { reason })),
        }
    }

    pub async fn controller(
        &self,
        ephemeral: bool,
        classifier_required: bool,
    ) -> Result<PredictionController> {
        let classifier = self.classifier(classifier_required)?;
        let store = self.store(ephemeral)?;
        Ok(PredictionController::load(classifier, store).await)
    }
}
