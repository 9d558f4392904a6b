//! Error hierarchy for the tracker's collaborators
//!
//! The analytics engine itself never fails; these errors come from the
//! completion store, importers, exporters and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for marathon-tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Completion store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Import/export errors
    #[error("Import/Export error: {0}")]
    ImportExport(#[from] ImportExportError),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Completion store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Week outside the plan
    #[error("Week {week} is outside the plan (1-16)")]
    WeekOutOfRange { week: u8 },

    /// Perceived effort outside 1-10
    #[error("Effort {effort} is outside 1-10")]
    EffortOutOfRange { effort: u8 },

    /// Backing file could not be decoded
    #[error("Corrupted store file {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// Backing file could not be written
    #[error("Failed to persist store to {path}: {reason}")]
    PersistFailed { path: PathBuf, reason: String },
}

/// Import and export errors
#[derive(Debug, Error)]
pub enum ImportExportError {
    /// No importer accepts the file
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Format-specific parsing error
    #[error("Parse error in {format}: {reason}")]
    ParseError { format: String, reason: String },

    /// Missing required data
    #[error("Missing required data: {field}")]
    MissingData { field: String },

    /// Export failed
    #[error("Export failed to {path}: {reason}")]
    ExportFailed { path: PathBuf, reason: String },
}

/// Result type alias for marathon-tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrackerError::Io(_) | TrackerError::Store(StoreError::PersistFailed { .. })
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackerError::Validation(_) => ErrorSeverity::Warning,
            TrackerError::Store(StoreError::WeekOutOfRange { .. })
            | TrackerError::Store(StoreError::EffortOutOfRange { .. }) => ErrorSeverity::Warning,
            TrackerError::ImportExport(ImportExportError::UnsupportedFormat { .. }) => {
                ErrorSeverity::Warning
            }
            TrackerError::Store(StoreError::Corrupted { .. }) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::Store(StoreError::WeekOutOfRange { week }) => {
                format!("Week {} is not part of the 16-week plan.", week)
            }
            TrackerError::Store(StoreError::EffortOutOfRange { effort }) => {
                format!("Effort must be between 1 and 10 (got {}).", effort)
            }
            TrackerError::Store(StoreError::Corrupted { path, .. }) => {
                format!(
                    "Your completion log at {} could not be read. Please check the file.",
                    path.display()
                )
            }
            TrackerError::ImportExport(ImportExportError::UnsupportedFormat { format }) => {
                format!("Files of type '{}' cannot be imported.", format)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Data loss or corruption
    Critical,
    /// Operation failed
    Error,
    /// Rejected input
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = TrackerError::Store(StoreError::WeekOutOfRange { week: 17 });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = TrackerError::Store(StoreError::Corrupted {
            path: PathBuf::from("completions.json"),
            reason: "expected value".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_retryable() {
        let err = TrackerError::Io(std::io::Error::new(std::io::ErrorKind::Interrupted, "eintr"));
        assert!(err.is_retryable());

        let err = TrackerError::Validation("bad day".to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err: TrackerError = StoreError::EffortOutOfRange { effort: 11 }.into();
        assert!(err.user_message().contains("between 1 and 10"));

        let err: TrackerError = ImportExportError::UnsupportedFormat {
            format: "gpx".to_string(),
        }
        .into();
        assert!(err.user_message().contains("'gpx'"));
    }
}
