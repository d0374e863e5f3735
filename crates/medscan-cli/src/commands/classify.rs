use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use medscan_application::PredictionController;
use medscan_infrastructure::upload_from_path;

use crate::render;

/// Classifies the first of `files` and prints the result.
pub async fn run(controller: &PredictionController, files: &[PathBuf]) -> Result<ExitCode> {
    let uploads = files.iter().map(upload_from_path).collect();
    if files.len() > 1 {
        tracing::info!(offered = files.len(), "Only the first file is classified");
    }

    match controller.submit_file(uploads).await {
        Ok(record) => {
            println!("{}", render::record(&record, controller.snapshot().await.theme));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let snapshot = controller.snapshot().await;
            let message = snapshot
                .error_message()
                .map(str::to_string)
                .unwrap_or_else(|| e.user_message());
            eprintln!("{}", render::failure(&message));
            tracing::debug!(error = %e, "Classification command failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
