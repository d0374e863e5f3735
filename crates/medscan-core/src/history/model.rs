use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classification::{ClassificationResult, Prediction};
use crate::feedback::FeedbackState;
use crate::image::ImageData;

/// Prefix of every generated record ID.
pub const RECORD_ID_PREFIX: &str = "pred_";

/// One completed analysis.
///
/// Created exactly once, when a classification result is produced. The image
/// and the result never change afterwards; only the feedback does, through
/// [`HistoryRecord::with_feedback`] on a copy or through the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    id: String,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(rename = "imageSrc")]
    image_data: ImageData,
    #[serde(rename = "prediction")]
    result: ClassificationResult,
    #[serde(default)]
    feedback: FeedbackState,
}

impl HistoryRecord {
    /// Creates a record with a fresh ID, the current time and no feedback.
    ///
    /// IDs embed a random v4 UUID, so collisions are not a practical concern
    /// even for records created within the same millisecond.
    pub fn new(image_data: ImageData, result: ClassificationResult) -> Self {
        Self {
            id: format!("{}{}", RECORD_ID_PREFIX, Uuid::new_v4().simple()),
            created_at: Utc::now(),
            image_data,
            result,
            feedback: FeedbackState::None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn image_data(&self) -> &ImageData {
        &self.image_data
    }

    pub fn result(&self) -> &ClassificationResult {
        &self.result
    }

    pub fn feedback(&self) -> FeedbackState {
        self.feedback
    }

    pub fn top_prediction(&self) -> &Prediction {
        self.result.top_prediction()
    }

    /// A copy of this record carrying `feedback`; every other field is kept.
    pub fn with_feedback(&self, feedback: FeedbackState) -> Self {
        Self {
            feedback,
            ..self.clone()
        }
    }

    pub(crate) fn set_feedback(&mut self, feedback: FeedbackState) {
        self.feedback = feedback;
    }

    /// One-line summary used in history listings.
    pub fn summary(&self) -> String {
        let top = self.top_prediction();
        format!(
            "{} ({}%) - {}",
            top.class,
            top.percentage(),
            self.created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        )
    }
}
