pub mod classify;
pub mod feedback;
pub mod history;
pub mod theme;

use medscan_application::PredictionController;

use crate::render;

/// Prints the store warning left by the last command, if any.
pub async fn report_warning(controller: &PredictionController) {
    if let Some(warning) = controller.snapshot().await.warning {
        eprintln!("{}", render::warning(&warning));
    }
}
