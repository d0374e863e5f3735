use std::process::ExitCode;

use anyhow::Result;
use medscan_application::PredictionController;
use medscan_core::feedback::FeedbackState;

use crate::render;

pub async fn run(
    controller: &PredictionController,
    id: &str,
    feedback: FeedbackState,
) -> Result<ExitCode> {
    match controller.give_feedback(id, feedback).await? {
        Some(record) => {
            let indicator = record.feedback().indicator();
            println!(
                "{} {} {}",
                indicator.glyph,
                indicator.label,
                record.summary()
            );
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("{}", render::failure(&format!("No prediction with ID {id}")));
            Ok(ExitCode::FAILURE)
        }
    }
}
