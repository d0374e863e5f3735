//! Error types for the MedScan application.

use thiserror::Error;

/// Message shown when an upload is rejected before any network call.
pub const VALIDATION_MESSAGE: &str =
    "File validation failed. Please upload images only (e.g., JPEG, PNG).";

/// Message shown when the uploaded file could not be read into memory.
pub const FILE_READ_MESSAGE: &str = "Failed to read the image file.";

/// Message shown for any failure of the remote classification call.
pub const CLASSIFICATION_MESSAGE: &str = "Failed to get prediction from AI. Please try again.";

/// A shared error type for the entire MedScan application.
///
/// The first five variants form the error taxonomy of the prediction
/// lifecycle; the remaining ones cover the ambient layers (configuration,
/// serialization, file system).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MedscanError {
    /// The upload is missing or is not an accepted image type.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The uploaded file could not be decoded into bytes.
    #[error("File read error: {0}")]
    FileRead(String),

    /// The remote classification call failed (transport, timeout, non-2xx).
    #[error("Classification failed: {0}")]
    ClassificationFailed(String),

    /// The remote call succeeded but the payload failed structural validation.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The local store could not be written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// No history record has the requested ID.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A submission was attempted while another one is still in flight.
    #[error("A classification is already in progress")]
    SubmissionInProgress,

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MedscanError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a FileRead error
    pub fn file_read(message: impl Into<String>) -> Self {
        Self::FileRead(message.into())
    }

    /// Creates a ClassificationFailed error
    pub fn classification_failed(message: impl Into<String>) -> Self {
        Self::ClassificationFailed(message.into())
    }

    /// Creates a MalformedResponse error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_file_read(&self) -> bool {
        matches!(self, Self::FileRead(_))
    }

    pub fn is_classification_failed(&self) -> bool {
        matches!(self, Self::ClassificationFailed(_))
    }

    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_submission_in_progress(&self) -> bool {
        matches!(self, Self::SubmissionInProgress)
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Short, stable name of the error category for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::FileRead(_) => "file_read",
            Self::ClassificationFailed(_) => "classification_failed",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Persistence(_) => "persistence",
            Self::NotFound(_) => "not_found",
            Self::SubmissionInProgress => "submission_in_progress",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// The one-line, human-readable message shown to the user.
    ///
    /// `ClassificationFailed` and `MalformedResponse` intentionally share a
    /// message; they stay distinguishable through [`MedscanError::kind`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => VALIDATION_MESSAGE.to_string(),
            Self::FileRead(_) => FILE_READ_MESSAGE.to_string(),
            Self::ClassificationFailed(_) | Self::MalformedResponse(_) => {
                CLASSIFICATION_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MedscanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MedscanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MedscanError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MedscanError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MedscanError>`.
pub type Result<T> = std::result::Result<T, MedscanError>;
