//! Classification domain module.
//!
//! - `model`: predictions, attention explanation and the classification result
//! - `classifier`: the contract of the remote classification client

mod classifier;
mod model;

pub use classifier::Classifier;
pub use model::{
    AttentionExplanation, ClassificationResult, ConfidenceLevel, EmptyPredictions, FocusArea,
    Prediction,
};
