//! Error handling for host lookup operations.
//!
//! This module defines one error type covering every way a run can fail,
//! from unreadable input files to resolver failures and bad configuration.

use std::fmt;

/// Main error type for host lookup operations.
///
/// Some variants are fatal to a run (the output sink cannot be opened,
/// configuration is invalid), the rest only affect one file or one name.
/// See [`LookupError::is_fatal`].
#[derive(Debug, Clone)]
pub enum LookupError {
    /// A token cannot be used as a host name (empty or too long)
    InvalidHostName {
        name: String,
        reason: String,
    },

    /// An input file could not be opened or read
    FileError {
        path: String,
        message: String,
    },

    /// The report destination could not be opened or written
    OutputError {
        path: String,
        message: String,
    },

    /// The external resolver could not produce an address
    ResolutionFailed {
        name: String,
        message: String,
    },

    /// A lookup took longer than the configured limit
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Configuration errors (invalid settings, unparsable files)
    ConfigError {
        message: String,
    },

    /// A spawned producer or resolver task panicked or was cancelled
    TaskFailed {
        task: String,
        message: String,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl LookupError {
    /// Create a new invalid host name error.
    pub fn invalid_host_name<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::InvalidHostName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new input file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new output sink error.
    pub fn output_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::OutputError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new resolution failure.
    pub fn resolution<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::ResolutionFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new task failure.
    pub fn task_failed<T: Into<String>, M: Into<String>>(task: T, message: M) -> Self {
        Self::TaskFailed {
            task: task.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error must stop the run before any task starts.
    ///
    /// Per-file and per-name failures are logged and the run continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OutputError { .. } | Self::ConfigError { .. } | Self::Internal { .. }
        )
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHostName { name, reason } => {
                write!(f, "Invalid host name '{}': {}", name, reason)
            }
            Self::FileError { path, message } => {
                write!(f, "Input file error at '{}': {}", path, message)
            }
            Self::OutputError { path, message } => {
                write!(f, "Output file error at '{}': {}", path, message)
            }
            Self::ResolutionFailed { name, message } => {
                write!(f, "Lookup failed for '{}': {}", name, message)
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::TaskFailed { task, message } => {
                write!(f, "Task '{}' failed: {}", task, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for LookupError {}

impl From<std::io::Error> for LookupError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for LookupError {
    fn from(err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            "task panicked".to_string()
        } else {
            err.to_string()
        };
        Self::TaskFailed {
            task: "spawned task".to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fatal_classification() {
        assert!(LookupError::output_error("out.txt", "permission denied").is_fatal());
        assert!(LookupError::config("bad capacity").is_fatal());
        assert!(!LookupError::file_error("names1.txt", "not found").is_fatal());
        assert!(!LookupError::resolution("bogus.invalid", "no address").is_fatal());
        assert!(!LookupError::timeout("lookup", Duration::from_secs(1)).is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = LookupError::file_error("names1.txt", "No such file or directory");
        assert_eq!(
            err.to_string(),
            "Input file error at 'names1.txt': No such file or directory"
        );

        let err = LookupError::invalid_host_name("", "empty");
        assert_eq!(err.to_string(), "Invalid host name '': empty");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err: LookupError = io.into();
        assert!(matches!(err, LookupError::Internal { .. }));
        assert!(err.to_string().contains("disk on fire"));
    }
}
