//! Prediction lifecycle state types.

use crate::error::MedscanError;
use crate::history::HistoryRecord;

/// Why the last submission ended in the `Failed` state.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// The underlying error, kept for logs and callers that branch on kind.
    pub error: MedscanError,
    /// One-line message shown to the user.
    pub message: String,
}

impl From<MedscanError> for Failure {
    fn from(error: MedscanError) -> Self {
        let message = error.user_message();
        Self { error, message }
    }
}

/// State of the prediction lifecycle.
///
/// ```text
/// Idle ──submit──▶ Loading ──success──▶ Displaying(record)
///   │                 └────failure────▶ Failed(failure)
///   └──invalid upload─────────────────▶ Failed(failure)
/// Displaying ──select / feedback──▶ Displaying
/// any ──clear history──▶ Idle
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Loading,
    Displaying(HistoryRecord),
    Failed(Failure),
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Displaying(_) => "displaying",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The record shown in detail, if any.
    pub fn current_record(&self) -> Option<&HistoryRecord> {
        match self {
            Self::Displaying(record) => Some(record),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VALIDATION_MESSAGE;

    #[test]
    fn test_failure_from_error_uses_user_message() {
        let failure = Failure::from(MedscanError::validation("text/plain"));
        assert_eq!(failure.message, VALIDATION_MESSAGE);
        assert!(failure.error.is_validation());
    }

    #[test]
    fn test_state_accessors() {
        let state = LifecycleState::default();
        assert_eq!(state.name(), "idle");
        assert!(state.current_record().is_none());
        assert!(!state.is_loading());

        let failed = LifecycleState::Failed(MedscanError::file_read("gone").into());
        assert_eq!(failed.failure().unwrap().error.kind(), "file_read");
    }
}
