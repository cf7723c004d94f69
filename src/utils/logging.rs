//! Logging system initialization
//!
//! Sets up tracing-based logging with file output to %APPDATA%\Pausa\app.log
//! and automatic rotation on application startup keeping 10 historical files.

use crate::error::Result;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Maximum number of historical log files to keep (app.log.1 through app.log.9)
const MAX_LOG_FILES: u8 = 9;

/// Initialize the logging system
///
/// Log level defaults to INFO but can be configured via `RUST_LOG` environment
/// variable. Rotates existing logs on startup to maintain a history of the
/// last 10 sessions.
pub fn init_logging() -> Result<()> {
    let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
    let log_dir = PathBuf::from(appdata).join("Pausa");
    std::fs::create_dir_all(&log_dir)?;

    // Rotate existing log files on startup
    let log_path = log_dir.join("app.log");
    rotate_logs_on_startup(&log_path)?;

    // tracing_appender's RollingFileAppender doesn't support startup-based
    // rotation with this retention policy, so rotation is handled manually
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| {
            // Preserve error chain by wrapping the source error
            crate::error::PausaError::ConfigError(Box::new(e))
        })?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false) // Disable ANSI colors for file output
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| crate::error::PausaError::ConfigError(Box::new(e)))?;

    tracing::info!("Pausa v{} started", env!("CARGO_PKG_VERSION"));

    Ok(())
}

/// Rotate log files on application startup
///
/// Rotates existing logs to maintain a history of the last 10 application
/// sessions: app.log.9 is deleted, app.log.N becomes app.log.N+1, and the
/// current app.log becomes app.log.1. A fresh app.log is created by the
/// logger afterwards.
fn rotate_logs_on_startup(log_path: &PathBuf) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path.parent().ok_or_else(|| {
        crate::error::PausaError::ConfigError(crate::error::StringError::new("Invalid log path"))
    })?;

    let log_name = log_path
        .file_name()
        .ok_or_else(|| {
            crate::error::PausaError::ConfigError(crate::error::StringError::new(
                "Invalid log filename",
            ))
        })?
        .to_string_lossy();

    // Delete the oldest log file if it exists
    let oldest_log = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    // Shift app.log.8 -> app.log.9, ..., app.log.1 -> app.log.2
    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = log_dir.join(format!("{log_name}.{i}"));
        let next_log = log_dir.join(format!("{log_name}.{}", i + 1));

        if current_log.exists() {
            std::fs::rename(&current_log, &next_log)?;
        }
    }

    // Rotate the current log file
    let log_1 = log_dir.join(format!("{log_name}.1"));
    std::fs::rename(log_path, &log_1)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_rotate_logs_on_startup_basic() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("app.log");

        fs::write(&log_path, "Session 1 log content").unwrap();
        rotate_logs_on_startup(&log_path).unwrap();

        let log_1 = temp_dir.path().join("app.log.1");
        assert!(log_1.exists(), "app.log.1 should exist after rotation");
        assert!(
            !log_path.exists(),
            "app.log should not exist after rotation (created fresh by logger)"
        );
        assert_eq!(fs::read_to_string(&log_1).unwrap(), "Session 1 log content");
    }

    #[test]
    fn test_rotate_logs_on_startup_no_existing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("app.log");

        assert!(rotate_logs_on_startup(&log_path).is_ok());
        assert!(!log_path.exists());
        assert!(!temp_dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_rotate_logs_respects_max_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("app.log");

        for i in 1..=12 {
            fs::write(&log_path, format!("Session {i} log content")).unwrap();
            rotate_logs_on_startup(&log_path).unwrap();
        }

        for i in 1..=MAX_LOG_FILES {
            assert!(
                temp_dir.path().join(format!("app.log.{i}")).exists(),
                "app.log.{i} should exist"
            );
        }
        assert!(!temp_dir.path().join("app.log.10").exists());

        // Most recent session sits in app.log.1, oldest retained in app.log.9
        let newest = fs::read_to_string(temp_dir.path().join("app.log.1")).unwrap();
        assert_eq!(newest, "Session 12 log content");
        let oldest = fs::read_to_string(temp_dir.path().join("app.log.9")).unwrap();
        assert_eq!(oldest, "Session 4 log content");
    }
}
