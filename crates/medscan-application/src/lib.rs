//! Application layer for MedScan.
//!
//! Hosts the prediction lifecycle controller that coordinates the
//! classification client with the history log and the theme preference.

pub mod prediction_controller;

pub use prediction_controller::{ControllerSnapshot, PERSISTENCE_WARNING, PredictionController};
