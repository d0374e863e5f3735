//! Classification domain models.
//!
//! Field names on the wire follow the JSON produced by the remote model
//! (`class`, `gradCam`, `focusArea`), which is also the persisted format.

use serde::{Deserialize, Serialize};

/// A single candidate label with the model's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted condition, e.g. `Pneumonia`.
    pub class: String,
    /// Confidence score, nominally in `[0, 1]`. Passed through unmodified.
    pub confidence: f64,
}

impl Prediction {
    pub fn new(class: impl Into<String>, confidence: f64) -> Self {
        Self {
            class: class.into(),
            confidence,
        }
    }

    /// Confidence as a whole percentage.
    pub fn percentage(&self) -> i64 {
        (self.confidence * 100.0).round() as i64
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }
}

/// Display tier for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    /// Above 85 %.
    High,
    /// Above 60 %.
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        let percentage = (confidence * 100.0).round() as i64;
        if percentage > 85 {
            Self::High
        } else if percentage > 60 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Bounding box of the region that most influenced the top prediction.
///
/// All four values are percentages of the image dimensions. The remote model
/// is asked to keep the box inside the image but nothing enforces it, so a
/// box may overflow; renderers should use [`FocusArea::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusArea {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl FocusArea {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Whether every value is in `[0, 100]` and the box ends inside the image.
    pub fn is_within_bounds(&self) -> bool {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        in_range(self.top)
            && in_range(self.left)
            && in_range(self.width)
            && in_range(self.height)
            && self.top + self.height <= 100.0
            && self.left + self.width <= 100.0
    }

    /// A copy of the box forced inside the image.
    pub fn clamped(&self) -> Self {
        let top = clamp_percent(self.top);
        let left = clamp_percent(self.left);
        Self {
            top,
            left,
            width: clamp_percent(self.width).min(100.0 - left),
            height: clamp_percent(self.height).min(100.0 - top),
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Attention visualization returned alongside the predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionExplanation {
    /// Human-readable description of what the model focused on.
    pub explanation: String,
    pub focus_area: FocusArea,
}

/// Result of one successful classification call. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClassificationResultRepr", into = "ClassificationResultRepr")]
pub struct ClassificationResult {
    predictions: Vec<Prediction>,
    attention: AttentionExplanation,
}

/// Serialized shape of [`ClassificationResult`].
#[derive(Serialize, Deserialize)]
struct ClassificationResultRepr {
    predictions: Vec<Prediction>,
    #[serde(rename = "gradCam")]
    attention: AttentionExplanation,
}

impl TryFrom<ClassificationResultRepr> for ClassificationResult {
    type Error = EmptyPredictions;

    fn try_from(repr: ClassificationResultRepr) -> Result<Self, Self::Error> {
        Self::new(repr.predictions, repr.attention)
    }
}

impl From<ClassificationResult> for ClassificationResultRepr {
    fn from(result: ClassificationResult) -> Self {
        Self {
            predictions: result.predictions,
            attention: result.attention,
        }
    }
}

impl ClassificationResult {
    /// Builds a result, refusing an empty prediction list.
    ///
    /// The list order is kept as given; it is not re-sorted.
    pub fn new(
        predictions: Vec<Prediction>,
        attention: AttentionExplanation,
    ) -> Result<Self, EmptyPredictions> {
        if predictions.is_empty() {
            return Err(EmptyPredictions);
        }
        Ok(Self {
            predictions,
            attention,
        })
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn attention(&self) -> &AttentionExplanation {
        &self.attention
    }

    /// The element at index 0, referenced throughout the UI and summaries.
    pub fn top_prediction(&self) -> &Prediction {
        // Construction guarantees at least one element.
        &self.predictions[0]
    }
}

/// Returned when a result is built without any predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("classification result must contain at least one prediction")]
pub struct EmptyPredictions;
