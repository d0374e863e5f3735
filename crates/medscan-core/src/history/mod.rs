//! Prediction history domain module.
//!
//! - `model`: a single persisted analysis (`HistoryRecord`)
//! - `log`: the ordered, persisted collection of records (`HistoryLog`)

mod log;
mod model;

pub use log::HistoryLog;
pub use model::{HistoryRecord, RECORD_ID_PREFIX};
