use std::process::ExitCode;

use anyhow::Result;
use medscan_application::PredictionController;

use crate::render;

pub async fn list(controller: &PredictionController) -> Result<ExitCode> {
    println!("{}", render::history(&controller.snapshot().await));
    Ok(ExitCode::SUCCESS)
}

pub async fn show(controller: &PredictionController, id: &str) -> Result<ExitCode> {
    match controller.select_history_record(id).await {
        Ok(record) => {
            println!("{}", render::record(&record, controller.snapshot().await.theme));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_not_found() => {
            eprintln!("{}", render::failure(&format!("No prediction with ID {id}")));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn clear(controller: &PredictionController) -> Result<ExitCode> {
    controller.clear_history().await?;
    println!("Prediction history cleared.");
    Ok(ExitCode::SUCCESS)
}
