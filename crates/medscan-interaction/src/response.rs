//! Structural validation of the model's JSON answer.
//!
//! Every field is optional at the serde level so a missing field surfaces as
//! a precise `MalformedResponse` message rather than a generic parse error.

use medscan_core::classification::{
    AttentionExplanation, ClassificationResult, FocusArea, Prediction,
};
use medscan_core::error::{MedscanError, Result};
use serde::Deserialize;

#[derive(Deserialize)]
struct RawClassification {
    predictions: Option<Vec<RawPrediction>>,
    #[serde(rename = "gradCam")]
    grad_cam: Option<RawGradCam>,
}

#[derive(Deserialize)]
struct RawPrediction {
    class: Option<String>,
    confidence: Option<f64>,
}

#[derive(Deserialize)]
struct RawGradCam {
    explanation: Option<String>,
    #[serde(rename = "focusArea")]
    focus_area: Option<RawFocusArea>,
}

#[derive(Deserialize)]
struct RawFocusArea {
    top: Option<f64>,
    left: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

/// Parses and validates the model's answer text.
///
/// Confidence values, prediction order and the focus area are forwarded
/// unchanged; anomalies are only logged.
pub fn parse_classification(text: &str) -> Result<ClassificationResult> {
    let json = strip_code_fence(text);
    let raw: RawClassification = serde_json::from_str(json).map_err(|e| {
        MedscanError::malformed_response(format!("answer is not valid JSON: {e}"))
    })?;

    let predictions = raw
        .predictions
        .ok_or_else(|| MedscanError::malformed_response("missing predictions"))?
        .into_iter()
        .enumerate()
        .map(|(index, prediction)| validate_prediction(index, prediction))
        .collect::<Result<Vec<_>>>()?;

    let grad_cam = raw
        .grad_cam
        .ok_or_else(|| MedscanError::malformed_response("missing gradCam"))?;
    let attention = validate_attention(grad_cam)?;

    log_anomalies(&predictions, &attention.focus_area);

    ClassificationResult::new(predictions, attention)
        .map_err(|e| MedscanError::malformed_response(e.to_string()))
}

fn validate_prediction(index: usize, raw: RawPrediction) -> Result<Prediction> {
    let class = raw
        .class
        .filter(|class| !class.trim().is_empty())
        .ok_or_else(|| {
            MedscanError::malformed_response(format!("prediction {index} has no class"))
        })?;
    let confidence = raw.confidence.ok_or_else(|| {
        MedscanError::malformed_response(format!("prediction {index} has no confidence"))
    })?;
    Ok(Prediction::new(class, confidence))
}

fn validate_attention(raw: RawGradCam) -> Result<AttentionExplanation> {
    let explanation = raw
        .explanation
        .ok_or_else(|| MedscanError::malformed_response("missing gradCam.explanation"))?;
    let area = raw
        .focus_area
        .ok_or_else(|| MedscanError::malformed_response("missing gradCam.focusArea"))?;

    let coordinate = |value: Option<f64>, name: &str| {
        value.ok_or_else(|| {
            MedscanError::malformed_response(format!("missing gradCam.focusArea.{name}"))
        })
    };

    Ok(AttentionExplanation {
        explanation,
        focus_area: FocusArea::new(
            coordinate(area.top, "top")?,
            coordinate(area.left, "left")?,
            coordinate(area.width, "width")?,
            coordinate(area.height, "height")?,
        ),
    })
}

fn log_anomalies(predictions: &[Prediction], focus_area: &FocusArea) {
    if predictions
        .iter()
        .any(|p| !(0.0..=1.0).contains(&p.confidence))
    {
        tracing::warn!("Model returned confidence values outside [0, 1]");
    }
    if predictions
        .windows(2)
        .any(|pair| pair[0].confidence < pair[1].confidence)
    {
        tracing::warn!("Model returned predictions not sorted by confidence");
    }
    if !focus_area.is_within_bounds() {
        tracing::warn!(?focus_area, "Model returned a focus area outside the image");
    }
}

/// Removes a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = r#"{
        "predictions": [
            {"class": "Pneumonia", "confidence": 0.91},
            {"class": "Normal", "confidence": 0.06},
            {"class": "Cardiomegaly", "confidence": 0.03}
        ],
        "gradCam": {
            "explanation": "Increased opacity in the right lower lobe.",
            "focusArea": {"top": 20, "left": 30, "width": 25, "height": 25}
        }
    }"#;

    #[test]
    fn test_parses_complete_answer() {
        let result = parse_classification(SCENARIO_A).unwrap();
        assert_eq!(result.predictions().len(), 3);
        assert_eq!(result.top_prediction().class, "Pneumonia");
        assert_eq!(result.top_prediction().confidence, 0.91);
        assert_eq!(
            result.attention().focus_area,
            FocusArea::new(20.0, 30.0, 25.0, 25.0)
        );
    }

    #[test]
    fn test_missing_predictions_is_malformed() {
        let err = parse_classification(
            r#"{"gradCam": {"explanation": "x", "focusArea": {"top": 1, "left": 1, "width": 1, "height": 1}}}"#,
        )
        .unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("missing predictions"));
    }

    #[test]
    fn test_empty_predictions_is_malformed() {
        let err = parse_classification(
            r#"{"predictions": [], "gradCam": {"explanation": "x", "focusArea": {"top": 1, "left": 1, "width": 1, "height": 1}}}"#,
        )
        .unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[test]
    fn test_missing_attention_is_malformed() {
        let err = parse_classification(r#"{"predictions": [{"class": "Normal", "confidence": 0.9}]}"#)
            .unwrap_err();
        assert!(err.is_malformed_response());

        let err = parse_classification(
            r#"{"predictions": [{"class": "Normal", "confidence": 0.9}], "gradCam": {"explanation": "x", "focusArea": {"top": 1, "left": 1, "width": 1}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("focusArea.height"));
    }

    #[test]
    fn test_incomplete_prediction_is_malformed() {
        let err = parse_classification(
            r#"{"predictions": [{"confidence": 0.9}], "gradCam": {"explanation": "x", "focusArea": {"top": 1, "left": 1, "width": 1, "height": 1}}}"#,
        )
        .unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(parse_classification("not json").unwrap_err().is_malformed_response());
    }

    #[test]
    fn test_values_pass_through_unchanged() {
        let result = parse_classification(
            r#"{"predictions": [{"class": "Normal", "confidence": 0.2}, {"class": "Pneumonia", "confidence": 1.4}],
                "gradCam": {"explanation": "x", "focusArea": {"top": 90, "left": 90, "width": 50, "height": 50}}}"#,
        )
        .unwrap();
        assert_eq!(result.top_prediction().class, "Normal");
        assert_eq!(result.predictions()[1].confidence, 1.4);
        assert_eq!(result.attention().focus_area.width, 50.0);
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let fenced = format!("```json\n{SCENARIO_A}\n```");
        assert!(parse_classification(&fenced).is_ok());
    }
}
