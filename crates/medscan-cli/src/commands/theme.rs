use std::process::ExitCode;

use anyhow::Result;
use medscan_application::PredictionController;

use crate::render;

pub async fn show(controller: &PredictionController) -> Result<ExitCode> {
    println!("{}", render::theme(controller.snapshot().await.theme));
    Ok(ExitCode::SUCCESS)
}

pub async fn toggle(controller: &PredictionController) -> Result<ExitCode> {
    let theme = controller.toggle_theme().await?;
    println!("{}", render::theme(theme));
    Ok(ExitCode::SUCCESS)
}
