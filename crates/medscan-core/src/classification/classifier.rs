//! Classification client trait.

use async_trait::async_trait;

use crate::classification::model::ClassificationResult;
use crate::error::Result;
use crate::image::ImageMimeType;

/// Converts one in-memory image into a classification result.
///
/// This is the only network boundary of the application. Implementations
/// must:
/// - fail with `MalformedResponse` instead of returning a partially
///   populated result,
/// - fail with `ClassificationFailed` on transport errors, timeouts and
///   unparseable responses,
/// - never retry on their own,
/// - forward confidence values and prediction order as received.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classifies `image_bytes`, which must be non-empty and of `mime_type`.
    async fn classify(
        &self,
        image_bytes: &[u8],
        mime_type: ImageMimeType,
    ) -> Result<ClassificationResult>;
}
