//! Error types for Pausa
//!
//! This module defines all error types used throughout the application,
//! providing clear error messages and proper error propagation.
//!
//! Error variants use `#[source]` to preserve error chains for better
//! observability and debugging.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for Pausa
#[derive(Debug, Error)]
pub enum PausaError {
    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Update check failed after exhausting the retry budget
    #[error("Update check failed: {0}")]
    UpdateCheckFailed(String),

    /// Update check network transport error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Update check network error: {0}")]
    UpdateNetworkError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// System tray error
    /// Preserves the underlying error source for full error chain transparency
    #[error("System tray error: {0}")]
    TrayError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for Pausa operations
pub type Result<T> = std::result::Result<T, PausaError>;

/// Convert an error to a user-friendly message
///
/// This function takes a `PausaError` and returns a message suitable
/// for displaying to end users in error dialogs.
pub fn get_user_friendly_error(error: &PausaError) -> String {
    match error {
        PausaError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to:\n\
             %APPDATA%\\Pausa"
            .to_string(),
        PausaError::UpdateCheckFailed(_) | PausaError::UpdateNetworkError(_) => {
            "Could not check for updates.\n\n\
             Please verify your network connection.\n\
             The application will try again later."
                .to_string()
        }
        PausaError::TrayError(_) => "Failed to create the system tray icon.\n\n\
             The application will keep running without tray integration."
            .to_string(),
        PausaError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        PausaError::JsonError(e) => {
            format!(
                "Configuration file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PausaError::UpdateCheckFailed("retry budget exhausted".to_string());
        assert_eq!(
            error.to_string(),
            "Update check failed: retry budget exhausted"
        );
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = PausaError::ConfigError(StringError::new("test"));
        let message = get_user_friendly_error(&error);
        assert!(message.contains("configuration"));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: PausaError = io_error.into();
        assert!(matches!(error, PausaError::IoError(_)));
    }

    #[test]
    fn test_update_errors_user_friendly() {
        let error = PausaError::UpdateCheckFailed("status 503".to_string());
        let message = get_user_friendly_error(&error);
        assert!(message.contains("network connection"));

        let error = PausaError::UpdateNetworkError(StringError::new("connection refused"));
        let message = get_user_friendly_error(&error);
        assert!(message.contains("try again later"));
    }

    #[test]
    fn test_tray_error_display() {
        let error = PausaError::TrayError(StringError::new("no display"));
        assert_eq!(error.to_string(), "System tray error: no display");
    }
}
