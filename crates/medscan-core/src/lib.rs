//! Domain layer of MedScan.
//!
//! Models, the shared error type and the traits at the I/O seams
//! (`KeyValueStore`, `Classifier`). The history log and the theme preference
//! live here because they only depend on the `KeyValueStore` trait.

pub mod classification;
pub mod config;
pub mod error;
pub mod feedback;
pub mod history;
pub mod image;
pub mod lifecycle;
pub mod store;
pub mod theme;

// Re-export common error type
pub use error::{MedscanError, Result};
