//! Deadline wrapper for any classifier.

use std::time::Duration;

use async_trait::async_trait;
use medscan_core::classification::{ClassificationResult, Classifier};
use medscan_core::error::{MedscanError, Result};
use medscan_core::image::ImageMimeType;

/// Fails a classification with `ClassificationFailed` once `timeout` elapses.
pub struct TimeoutClassifier<C> {
    inner: C,
    timeout: Duration,
}

impl<C: Classifier> TimeoutClassifier<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<C: Classifier> Classifier for TimeoutClassifier<C> {
    async fn classify(
        &self,
        image_bytes: &[u8],
        mime_type: ImageMimeType,
    ) -> Result<ClassificationResult> {
        match tokio::time::timeout(self.timeout, self.inner.classify(image_bytes, mime_type)).await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Classification timed out");
                Err(MedscanError::classification_failed(format!(
                    "no answer within {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medscan_core::classification::{AttentionExplanation, FocusArea, Prediction};

    struct SlowClassifier {
        delay: Duration,
    }

    #[async_trait]
    impl Classifier for SlowClassifier {
        async fn classify(&self, _: &[u8], _: ImageMimeType) -> Result<ClassificationResult> {
            tokio::time::sleep(self.delay).await;
            Ok(ClassificationResult::new(
                vec![Prediction::new("Normal", 0.9)],
                AttentionExplanation {
                    explanation: "clear".to_string(),
                    focus_area: FocusArea::new(0.0, 0.0, 10.0, 10.0),
                },
            )
            .unwrap())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let classifier = TimeoutClassifier::new(
            SlowClassifier {
                delay: Duration::from_secs(120),
            },
            Duration::from_secs(60),
        );
        let err = classifier
            .classify(b"img", ImageMimeType::Png)
            .await
            .unwrap_err();
        assert!(err.is_classification_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_passes_through_fast_answers() {
        let classifier = TimeoutClassifier::new(
            SlowClassifier {
                delay: Duration::from_secs(1),
            },
            Duration::from_secs(60),
        );
        let result = classifier.classify(b"img", ImageMimeType::Png).await.unwrap();
        assert_eq!(result.top_prediction().class, "Normal");
    }
}
