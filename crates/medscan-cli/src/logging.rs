//! Tracing setup for the `medscan` binary.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "medscan.log";

const MEDSCAN_TARGETS: [&str; 5] = [
    "medscan",
    "medscan_core",
    "medscan_infrastructure",
    "medscan_interaction",
    "medscan_application",
];

/// `warn` for everything, with the medscan crates raised to `level`.
fn medscan_filter(level: &str) -> EnvFilter {
    MEDSCAN_TARGETS
        .iter()
        .filter_map(|target| format!("{target}={level}").parse::<Directive>().ok())
        .fold(EnvFilter::new("warn"), EnvFilter::add_directive)
}

/// Builds the file filter: `RUST_LOG` when set, otherwise the medscan crates
/// at `info`.
fn file_filter() -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::from_default_env();
    }
    medscan_filter("info")
}

/// Stderr carries warnings only, or medscan debug output when `verbose`.
fn stderr_filter(verbose: bool) -> EnvFilter {
    if verbose {
        medscan_filter("debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Installs stderr logging plus a daily rolling file in `logs_dir`.
///
/// Stderr only carries warnings unless `verbose` is set, so command output
/// stays readable. The returned guard flushes the file writer on drop.
pub fn init(logs_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter(verbose));

    let mut guard = None;
    let file_layer = match logs_dir {
        Some(dir) if std::fs::create_dir_all(dir).is_ok() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            guard = Some(file_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter()),
            )
        }
        _ => None,
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}
