use crate::domain::settings::LogSettings;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the daily log file under `log_dir`.
const LOG_FILE: &str = "bt-switch.log";

/// Keeps the file writer flushing until dropped at the end of `main`.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// `RUST_LOG` wins, then `-v`/`-q`, then `[log] level`.
pub fn level_filter(settings: &LogSettings, level_override: Option<&str>) -> EnvFilter {
    let level = level_override.unwrap_or(&settings.level);
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::from_str(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_logger(
    settings: &LogSettings,
    level_override: Option<&str>,
) -> anyhow::Result<LoggingGuard> {
    // stdout carries the report
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(settings.color)
        .without_time();

    let (file_layer, file_guard) = if settings.file {
        std::fs::create_dir_all(&settings.log_dir)?;
        let appender = tracing_appender::rolling::daily(&settings.log_dir, LOG_FILE);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(level_filter(settings, level_override))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!("Logging initialized");

    Ok(LoggingGuard { _file: file_guard })
}
