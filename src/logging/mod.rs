//! Logging system initialization
//!
//! Uses the tracing ecosystem for structured logging with support for:
//! - Environment variable override (CULLD_LOG)
//! - File output with daily rotation
//! - Console output
//!
//! Every outcome of a reconciliation pass is observable through log lines
//! only; there is no other success/failure signal.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::LoggingSettings;

/// Get the default log directory path
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("culld")
        .join("logs")
}

/// Initialize the logging system
///
/// # Environment Variables
/// - `CULLD_LOG`: Override log level (e.g., "culld=debug")
pub fn init_logging(settings: &LoggingSettings) {
    let env_filter = EnvFilter::try_from_env("CULLD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("culld={}", settings.level)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .boxed();

    let file_layer = if settings.file_output {
        let log_dir = settings.file_path.clone().unwrap_or_else(default_log_dir);

        match std::fs::create_dir_all(&log_dir) {
            Err(e) => {
                eprintln!("Warning: Failed to create log directory {:?}: {}", log_dir, e);
                None
            }
            Ok(()) => {
                let file_appender =
                    RollingFileAppender::new(Rotation::DAILY, &log_dir, "culld.log");

                let file_layer = fmt::layer()
                    .with_writer(file_appender)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false);

                Some(file_layer.boxed())
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!(
        level = %settings.level,
        file_output = settings.file_output,
        "Logging configuration"
    );
}
