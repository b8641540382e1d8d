//! Unified error hierarchy for planrs
//!
//! The expansion and metrics core never fails; every error here originates at a boundary:
//! reading a workout, validating it, collecting it interactively, or writing an output.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Top-level error type for all planrs operations
#[derive(Debug, Error)]
pub enum PlanError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Workout document could not be decoded
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Workout structure rejected before reaching the core
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Plan or chart output could not be produced
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Interactive input ended or could not be read
    #[error("Prompt error: {0}")]
    Prompt(String),
}

/// Workout decoding errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// Source file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Format-specific decoding error
    #[error("Invalid {format} workout: {reason}")]
    Malformed { format: String, reason: String },

    /// Document could not be re-encoded for saving
    #[error("Could not encode workout as {format}: {reason}")]
    Encode { format: String, reason: String },
}

/// Output rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failure while writing a plan or chart file
    #[error("Failed to write {target} to {path}: {reason}")]
    WriteFailed {
        target: String,
        path: PathBuf,
        reason: String,
    },

    /// Nothing to draw
    #[error("Cannot render {target}: {reason}")]
    EmptyWorkout { target: String, reason: String },

    /// Drawing backend failure
    #[error("Chart backend error: {0}")]
    Backend(String),
}

/// All blocking issues found by validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|issue| issue.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Result type alias for planrs operations
pub type Result<T> = std::result::Result<T, PlanError>;

impl PlanError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlanError::Parse(ParseError::FileNotFound { .. }) => ErrorSeverity::Warning,
            PlanError::Validation(_) => ErrorSeverity::Warning,
            PlanError::Prompt(_) => ErrorSeverity::Warning,
            PlanError::Io(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Log the failure at the level its severity maps to
    pub fn log(&self) {
        let level = self.severity().to_tracing_level();
        if level == tracing::Level::WARN {
            tracing::warn!(severity = ?self.severity(), error = %self, "Command failed");
        } else {
            tracing::error!(severity = ?self.severity(), error = %self, "Command failed");
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PlanError::Parse(ParseError::FileNotFound { path }) => {
                format!("Could not find workout file: {}", path.display())
            }
            PlanError::Parse(ParseError::Malformed { format, reason }) => {
                format!("The workout file is not valid {}: {}", format, reason)
            }
            PlanError::Validation(errors) => {
                format!("The workout has {} problem(s): {}", errors.0.len(), errors)
            }
            PlanError::Prompt(reason) => format!("Workout entry was interrupted: {}", reason),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Environment failure (disk, permissions)
    Critical,
    /// Error that prevents the requested output
    Error,
    /// Problem with the user's input
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = PlanError::Parse(ParseError::FileNotFound {
            path: PathBuf::from("/test/workout.yaml"),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = PlanError::Render(RenderError::Backend("font missing".to_string()));
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_severity_by_boundary() {
        let io = PlanError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
        assert_eq!(io.severity().to_tracing_level(), tracing::Level::ERROR);

        let prompt = PlanError::Prompt("input ended".to_string());
        assert_eq!(prompt.severity(), ErrorSeverity::Warning);

        let config = PlanError::Configuration("bad chart size".to_string());
        assert_eq!(config.severity().to_tracing_level(), tracing::Level::ERROR);

        // Logging without an installed subscriber is a no-op
        io.log();
        prompt.log();
    }

    #[test]
    fn test_user_messages() {
        let err = PlanError::Parse(ParseError::FileNotFound {
            path: PathBuf::from("workout.yaml"),
        });
        assert!(err.user_message().contains("Could not find"));

        let err = PlanError::Validation(ValidationErrors(vec![
            ValidationIssue::new("intervals[0]", "duration must be positive"),
            ValidationIssue::new("name", "workout name is empty"),
        ]));
        let message = err.user_message();
        assert!(message.contains("2 problem(s)"));
        assert!(message.contains("intervals[0]: duration must be positive"));
    }
}
