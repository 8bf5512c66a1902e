//! Logging setup
//!
//! Installs a `tracing` subscriber writing to stderr, and optionally to
//! `log_dir/hdr-wsi.log` through a non-blocking appender. The layer lives
//! inside someone else's process, so an already installed global subscriber
//! wins and is left alone.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable holding a full `EnvFilter` directive
pub const LOG_FILTER_ENV: &str = "HDR_WSI_LOG";

/// Log file name inside `log_dir`
pub const LOG_FILE_NAME: &str = "hdr-wsi.log";

/// Filter used when `HDR_WSI_LOG` is unset
pub fn default_filter(level: &str) -> String {
    format!("hdr_wsi_layer={level},hdr_wsi_probe={level},warn")
}

/// Install the global subscriber
///
/// Returns the file writer's guard, which must be kept alive for buffered
/// lines to reach the file. `Ok(None)` when there is no file or another
/// subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    let (file_writer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let installed = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .with(file_writer.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
            }))
            .try_init(),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .with(file_writer.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
            }))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .with(file_writer.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(false)
            }))
            .try_init(),
    };

    match installed {
        Ok(()) => Ok(guard),
        // Host application owns the global subscriber
        Err(_) => Ok(None),
    }
}
