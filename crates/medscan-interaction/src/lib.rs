//! Remote classification clients.

pub mod gemini_classifier;
pub mod prompts;
pub mod response;
pub mod timeout;

pub use gemini_classifier::GeminiClassifier;
pub use response::parse_classification;
pub use timeout::TimeoutClassifier;
