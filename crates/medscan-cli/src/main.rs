use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use medscan_core::feedback::FeedbackState;
use medscan_infrastructure::MedscanPaths;

mod bootstrap;
mod commands;
mod logging;
mod render;

use bootstrap::Bootstrap;

#[derive(Parser)]
#[command(name = "medscan")]
#[command(about = "MedScan - classify medical scans with a multimodal model", long_about = None)]
struct Cli {
    /// Keep config, history and logs under this directory
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Keep history and theme in memory only for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Also print info and debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a scan (only the first file is used)
    Classify {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Browse or clear past predictions
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Mark a prediction as correct or incorrect
    Feedback {
        id: String,
        #[arg(value_parser = parse_feedback)]
        value: FeedbackState,
    },
    /// Show or switch the color theme used for results and history
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List past predictions, newest first
    List,
    /// Show one prediction in detail
    Show { id: String },
    /// Delete every past prediction
    Clear,
}

#[derive(Subcommand)]
enum ThemeAction {
    Show,
    Toggle,
}

fn parse_feedback(value: &str) -> Result<FeedbackState, String> {
    value
        .parse()
        .map_err(|_| format!("expected correct, incorrect or none, got '{value}'"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let paths = MedscanPaths::new(cli.data_dir.as_deref());
    let logs_dir = paths.logs_dir().ok();
    let _log_guard = logging::init(logs_dir.as_deref(), cli.verbose);

    let app = Bootstrap::load(paths).await?;

    let classifier_required = matches!(cli.command, Commands::Classify { .. });
    let controller = app.controller(cli.ephemeral, classifier_required).await?;

    let code = match &cli.command {
        Commands::Classify { files } => commands::classify::run(&controller, files).await?,
        Commands::History { action } => match action {
            HistoryAction::List => commands::history::list(&controller).await?,
            HistoryAction::Show { id } => commands::history::show(&controller, id).await?,
            HistoryAction::Clear => commands::history::clear(&controller).await?,
        },
        Commands::Feedback { id, value } => {
            commands::feedback::run(&controller, id, *value).await?
        }
        Commands::Theme { action } => match action {
            ThemeAction::Show => commands::theme::show(&controller).await?,
            ThemeAction::Toggle => commands::theme::toggle(&controller).await?,
        },
    };

    commands::report_warning(&controller).await;
    Ok(code)
}
