//! User feedback on a prediction.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The user's correctness judgment on a prediction.
///
/// Each new value replaces the previous one; no feedback history is kept.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FeedbackState {
    #[default]
    None,
    Correct,
    Incorrect,
}

/// How a feedback value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackIndicator {
    pub label: &'static str,
    pub glyph: &'static str,
}

impl FeedbackState {
    pub fn indicator(&self) -> FeedbackIndicator {
        match self {
            Self::Correct => FeedbackIndicator {
                label: "Correct",
                glyph: "✔",
            },
            Self::Incorrect => FeedbackIndicator {
                label: "Incorrect",
                glyph: "✘",
            },
            Self::None => FeedbackIndicator {
                label: "No feedback",
                glyph: "?",
            },
        }
    }

    pub fn is_given(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_is_none() {
        assert_eq!(FeedbackState::default(), FeedbackState::None);
        assert!(!FeedbackState::None.is_given());
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(FeedbackState::Correct.to_string(), "correct");
        assert_eq!(
            FeedbackState::from_str("Incorrect").unwrap(),
            FeedbackState::Incorrect
        );
        assert_eq!(
            serde_json::to_string(&FeedbackState::None).unwrap(),
            "\"none\""
        );
        assert!(FeedbackState::from_str("maybe").is_err());
    }

    #[test]
    fn test_indicators_are_distinct() {
        let glyphs = [
            FeedbackState::None.indicator().glyph,
            FeedbackState::Correct.indicator().glyph,
            FeedbackState::Incorrect.indicator().glyph,
        ];
        assert_ne!(glyphs[0], glyphs[1]);
        assert_ne!(glyphs[1], glyphs[2]);
        assert_ne!(glyphs[0], glyphs[2]);
    }
}
